//! Processing Engine protocol
//!
//! The orchestration layer drives codecs and effect DSP through the
//! `Engine`, `AudioStream` and `Effect` traits:
//! - Lifecycle (`init` / `quit`)
//! - Opening streams for reading, writing or reading from memory
//! - Effect lookup by name and instantiation
//!
//! `NativeEngine` is the bundled implementation.

mod handle;
pub mod native;
mod registry;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{FlowError, Result};
use crate::format::{EncodingDescriptor, Sample, SignalDescriptor};

pub use handle::FormatHandle;
pub use native::NativeEngine;
pub use registry::{EffectConstructor, EffectInfo, EffectRegistry};

/// Result type for engine calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failure reported by a processing engine
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::new(err.to_string())
    }
}

impl From<hound::Error> for EngineError {
    fn from(err: hound::Error) -> Self {
        EngineError::new(err.to_string())
    }
}

/// Optional hints passed when opening a stream for reading
#[derive(Debug, Clone, Default)]
pub struct FormatHints {
    pub signal: Option<SignalDescriptor>,
    pub encoding: Option<EncodingDescriptor>,
    pub file_type: Option<String>,
}

impl FormatHints {
    pub fn new(
        signal: Option<SignalDescriptor>,
        encoding: Option<EncodingDescriptor>,
        file_type: Option<&str>,
    ) -> Self {
        Self {
            signal,
            encoding,
            file_type: file_type.map(str::to_string),
        }
    }
}

/// An open engine stream (decoding or encoding session)
pub trait AudioStream: Send {
    /// Signal format of the stream
    fn signal(&self) -> &SignalDescriptor;

    /// Encoding of the stream
    fn encoding(&self) -> &EncodingDescriptor;

    /// Position the read cursor at an absolute sample index.
    ///
    /// Fails when the offset is at or past end of stream for the engine.
    fn seek(&mut self, offset: u64) -> EngineResult<()>;

    /// Read up to `buf.len()` samples, returning how many were produced
    fn read(&mut self, buf: &mut [Sample]) -> usize;

    /// Write samples, returning how many were accepted
    fn write(&mut self, buf: &[Sample]) -> usize;

    /// Flush and release the stream
    fn close(self: Box<Self>) -> EngineResult<()>;
}

/// An instantiated engine effect
pub trait Effect: Send {
    /// Effect name as registered
    fn name(&self) -> &str;

    /// Parse and validate the argument list
    fn configure(&mut self, args: &[String]) -> EngineResult<()>;

    /// Connect the effect between an input signal and the chain's target.
    ///
    /// Returns the signal this effect produces. Effects that do not change
    /// the stream shape return their input.
    fn connect(
        &mut self,
        input: &SignalDescriptor,
        _target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        Ok(input.clone())
    }

    /// Process a whole interleaved buffer
    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>>;
}

/// A processing engine providing codec I/O and effects
pub trait Engine: Send + Sync {
    /// Short engine name for diagnostics
    fn name(&self) -> &str;

    /// Enter the engine lifecycle
    fn init(&self) -> EngineResult<()>;

    /// Leave the engine lifecycle
    fn quit(&self) -> EngineResult<()>;

    fn is_initialized(&self) -> bool;

    /// Open a named resource for reading
    fn open_read(&self, path: &Path, hints: &FormatHints) -> EngineResult<Box<dyn AudioStream>>;

    /// Open an in-memory buffer for reading
    fn open_mem_read(
        &self,
        data: Vec<u8>,
        hints: &FormatHints,
    ) -> EngineResult<Box<dyn AudioStream>>;

    /// Open a named resource for writing
    fn open_write(
        &self,
        path: &Path,
        signal: &SignalDescriptor,
        encoding: Option<&EncodingDescriptor>,
        file_type: Option<&str>,
    ) -> EngineResult<Box<dyn AudioStream>>;

    /// Names of all effects the engine can instantiate
    fn effect_names(&self) -> Vec<String>;

    /// Look up and instantiate an effect, `None` if the name is unknown
    fn create_effect(&self, name: &str) -> Option<Box<dyn Effect>>;

    /// A fresh, engine-unique path for a temporary resource
    fn temp_path(&self, extension: &str) -> PathBuf;

    /// Whether `open_mem_read` is available on this platform
    fn supports_memory_streams(&self) -> bool {
        true
    }
}

/// Fail unless the engine lifecycle has been entered
pub(crate) fn ensure_ready(engine: &dyn Engine) -> Result<()> {
    if engine.is_initialized() {
        Ok(())
    } else {
        Err(FlowError::NotInitialized {
            engine: engine.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::new("bad header");
        assert_eq!(err.to_string(), "bad header");
        assert_eq!(err.message(), "bad header");
    }

    #[test]
    fn test_ensure_ready_requires_init() {
        let engine = NativeEngine::default();
        let err = ensure_ready(&engine).unwrap_err();
        assert_eq!(err.error_code(), "NOT_INITIALIZED");

        engine.init().unwrap();
        assert!(ensure_ready(&engine).is_ok());
        engine.quit().unwrap();
        assert!(ensure_ready(&engine).is_err());
    }
}
