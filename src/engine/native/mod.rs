//! Native processing engine
//!
//! Reference `Engine` implementation: WAV through `hound`, headerless raw
//! containers through `byteorder`, and a small set of built-in effects.

mod container;
mod effects;
mod pcm;
mod raw;
mod wav;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use uuid::Uuid;

use super::{
    AudioStream, Effect, EffectInfo, EffectRegistry, Engine, EngineError, EngineResult,
    FormatHints,
};
use crate::config::EngineConfig;
use crate::format::{EncodingDescriptor, SignalDescriptor};
use container::FileType;
use raw::{RawSink, RawSource};
use wav::{WavSink, WavSource};

pub use effects::{Channels, Gain, Rate, Remix, Reverse, Speed, Trim, Vol};

/// Bundled engine backed by `hound` and `byteorder`
#[derive(Debug)]
pub struct NativeEngine {
    registry: EffectRegistry,
    temp_dir: PathBuf,
    running: AtomicBool,
}

impl NativeEngine {
    /// Create an engine from configuration
    pub fn new(config: &EngineConfig) -> Self {
        let temp_dir = config
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        Self::with_temp_dir(temp_dir)
    }

    /// Create an engine that places temporary files in `temp_dir`
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        let mut registry = EffectRegistry::new();
        effects::register_builtins(&mut registry);
        Self {
            registry,
            temp_dir: temp_dir.into(),
            running: AtomicBool::new(false),
        }
    }

    /// Register an additional effect
    pub fn register_effect<F>(&mut self, info: EffectInfo, constructor: F)
    where
        F: Fn() -> Box<dyn Effect> + Send + Sync + 'static,
    {
        self.registry.register(info, constructor);
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn check_running(&self) -> EngineResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(EngineError::new("engine is not initialized"))
        }
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Engine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    fn init(&self) -> EngineResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::new("engine is already initialized"));
        }
        info!(
            "Native engine started ({} effects, temp dir {})",
            self.registry.len(),
            self.temp_dir.display()
        );
        Ok(())
    }

    fn quit(&self) -> EngineResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(EngineError::new("engine is not running"));
        }
        info!("Native engine stopped");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn open_read(&self, path: &Path, hints: &FormatHints) -> EngineResult<Box<dyn AudioStream>> {
        self.check_running()?;
        let file_type = FileType::detect(
            hints.file_type.as_deref(),
            Some(path),
            hints.encoding.as_ref(),
        )?;
        debug!("Opening {} for reading as {:?}", path.display(), file_type);

        match file_type {
            FileType::Wav => Ok(Box::new(WavSource::open(path)?)),
            FileType::Raw(layout) => Ok(Box::new(RawSource::open(
                path,
                layout,
                hints.signal.as_ref(),
            )?)),
        }
    }

    fn open_mem_read(
        &self,
        data: Vec<u8>,
        hints: &FormatHints,
    ) -> EngineResult<Box<dyn AudioStream>> {
        self.check_running()?;
        match FileType::detect(hints.file_type.as_deref(), None, hints.encoding.as_ref())? {
            FileType::Raw(layout) => Ok(Box::new(RawSource::from_bytes(
                &data,
                layout,
                hints.signal.as_ref(),
            )?)),
            FileType::Wav => Err(EngineError::new(
                "memory streams support headerless types only",
            )),
        }
    }

    fn open_write(
        &self,
        path: &Path,
        signal: &SignalDescriptor,
        encoding: Option<&EncodingDescriptor>,
        file_type: Option<&str>,
    ) -> EngineResult<Box<dyn AudioStream>> {
        self.check_running()?;
        let container = FileType::detect(file_type, Some(path), encoding)?;
        debug!("Opening {} for writing as {:?}", path.display(), container);

        match container {
            FileType::Wav => Ok(Box::new(WavSink::create(path, signal, encoding)?)),
            FileType::Raw(layout) => Ok(Box::new(RawSink::create(path, signal, layout)?)),
        }
    }

    fn effect_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn create_effect(&self, name: &str) -> Option<Box<dyn Effect>> {
        self.registry.create(name)
    }

    fn temp_path(&self, extension: &str) -> PathBuf {
        self.temp_dir.join(format!(
            "audioflow-{}.{}",
            Uuid::new_v4().simple(),
            extension
        ))
    }
}
