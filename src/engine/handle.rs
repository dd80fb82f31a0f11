//! Scoped engine stream handle
//!
//! A `FormatHandle` owns an open `AudioStream`. The stream is closed exactly
//! once: by `close()` on the happy path, or by `Drop` on every other path.

use std::path::Path;

use log::{debug, warn};

use super::{AudioStream, Engine, FormatHints};
use crate::error::{FlowError, Result};
use crate::format::{EncodingDescriptor, SignalDescriptor};

/// Owned engine stream, released on every exit path
pub struct FormatHandle {
    label: String,
    signal: SignalDescriptor,
    encoding: EncodingDescriptor,
    stream: Option<Box<dyn AudioStream>>,
}

impl FormatHandle {
    fn from_stream(label: String, stream: Box<dyn AudioStream>) -> Self {
        debug!("Opened engine handle: {}", label);
        Self {
            label,
            signal: stream.signal().clone(),
            encoding: stream.encoding().clone(),
            stream: Some(stream),
        }
    }

    /// Open a named resource for reading
    pub fn open_read(engine: &dyn Engine, path: &Path, hints: &FormatHints) -> Result<Self> {
        let stream = engine
            .open_read(path, hints)
            .map_err(|e| FlowError::open(path, e))?;
        Ok(Self::from_stream(path.display().to_string(), stream))
    }

    /// Open an in-memory buffer for reading
    pub fn open_mem_read(
        engine: &dyn Engine,
        data: Vec<u8>,
        hints: &FormatHints,
    ) -> Result<Self> {
        let len = data.len();
        let stream = engine
            .open_mem_read(data, hints)
            .map_err(|e| FlowError::Open {
                path: format!("<memory: {} bytes>", len),
                reason: e.to_string(),
            })?;
        Ok(Self::from_stream(format!("<memory: {} bytes>", len), stream))
    }

    /// Open a named resource for writing
    pub fn open_write(
        engine: &dyn Engine,
        path: &Path,
        signal: &SignalDescriptor,
        encoding: Option<&EncodingDescriptor>,
        file_type: Option<&str>,
    ) -> Result<Self> {
        let stream = engine
            .open_write(path, signal, encoding, file_type)
            .map_err(|e| FlowError::open(path, e))?;
        Ok(Self::from_stream(path.display().to_string(), stream))
    }

    /// Path (or memory label) the handle was opened on
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn signal(&self) -> &SignalDescriptor {
        &self.signal
    }

    pub fn encoding(&self) -> &EncodingDescriptor {
        &self.encoding
    }

    /// Borrow the open stream
    pub(crate) fn stream_mut(&mut self) -> Result<&mut dyn AudioStream> {
        match self.stream.as_deref_mut() {
            Some(stream) => Ok(stream),
            None => Err(FlowError::Open {
                path: self.label.clone(),
                reason: "handle already released".to_string(),
            }),
        }
    }

    /// Close the stream and report any failure to finalize it
    pub fn close(mut self) -> Result<()> {
        match self.stream.take() {
            Some(stream) => {
                debug!("Closing engine handle: {}", self.label);
                stream.close().map_err(|e| FlowError::Close {
                    path: self.label.clone(),
                    reason: e.to_string(),
                })
            }
            None => Ok(()),
        }
    }
}

impl Drop for FormatHandle {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("Releasing engine handle: {}", self.label);
            if let Err(e) = stream.close() {
                warn!("Failed to release handle {}: {}", self.label, e);
            }
        }
    }
}

impl std::fmt::Debug for FormatHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatHandle")
            .field("label", &self.label)
            .field("signal", &self.signal)
            .field("open", &self.stream.is_some())
            .finish()
    }
}
