//! Session facade
//!
//! A `Session` owns one engine for the span of its lifecycle: `init` enters
//! it, `quit` (or drop) leaves it. All operations go through the session so
//! they can never run against an engine that was not started.

use std::path::Path;

use log::{info, warn};

use crate::config::{Config, FlowConfig};
use crate::effects::EffectSpec;
use crate::engine::{ensure_ready, Engine, NativeEngine};
use crate::error::{FlowError, Result};
use crate::flow::FlowExecutor;
use crate::format::{Audio, EncodingDescriptor, Sample, SignalDescriptor};
use crate::io::{self, ReadOptions};

/// An initialized engine plus flow configuration
pub struct Session<E: Engine = NativeEngine> {
    engine: E,
    config: FlowConfig,
    active: bool,
}

impl Session<NativeEngine> {
    /// Start a session on the native engine
    pub fn native(config: &Config) -> Result<Self> {
        Self::init(NativeEngine::new(&config.engine), config.flow.clone())
    }
}

impl<E: Engine> Session<E> {
    /// Enter the engine lifecycle
    pub fn init(engine: E, config: FlowConfig) -> Result<Self> {
        engine.init().map_err(FlowError::Lifecycle)?;
        info!("Session started on engine '{}'", engine.name());
        Ok(Self {
            engine,
            config,
            active: true,
        })
    }

    /// Leave the engine lifecycle
    pub fn quit(mut self) -> Result<()> {
        self.active = false;
        self.engine.quit().map_err(FlowError::Lifecycle)?;
        info!("Session on engine '{}' closed", self.engine.name());
        Ok(())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Read a window of frames from a file
    pub fn read_audio_file(&self, path: &Path, options: &ReadOptions) -> Result<Audio> {
        io::read_audio_file(&self.engine, path, options)
    }

    /// Write a whole buffer to a file
    pub fn write_audio_file(
        &self,
        path: &Path,
        samples: &[Sample],
        signal: &SignalDescriptor,
        encoding: Option<&EncodingDescriptor>,
        file_type: Option<&str>,
    ) -> Result<usize> {
        io::write_audio_file(&self.engine, path, samples, signal, encoding, file_type)
    }

    /// Signal and encoding of a file
    pub fn get_info(&self, path: &Path) -> Result<(SignalDescriptor, EncodingDescriptor)> {
        io::get_info(&self.engine, path)
    }

    /// Names of every effect the engine provides
    pub fn list_effect_names(&self) -> Result<Vec<String>> {
        ensure_ready(&self.engine)?;
        Ok(self.engine.effect_names())
    }

    /// Run an effects flow over an interleaved buffer
    pub fn run_effects_flow(
        &self,
        samples: &[Sample],
        input_signal: &SignalDescriptor,
        target_signal: Option<&SignalDescriptor>,
        target_encoding: Option<&EncodingDescriptor>,
        effects: &[EffectSpec],
    ) -> Result<Audio> {
        FlowExecutor::new(&self.engine, self.config.clone()).execute(
            samples,
            input_signal,
            target_signal,
            target_encoding,
            effects,
        )
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        if self.active {
            warn!("Session dropped without quit; stopping engine '{}'", self.engine.name());
            if let Err(e) = self.engine.quit() {
                warn!("Engine quit failed: {}", e);
            }
        }
    }
}
