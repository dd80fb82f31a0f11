//! Source materialization
//!
//! The engine only reads audio through its own streams, so the caller's
//! buffer is first made engine-readable: written to a temporary WAV file, or
//! encoded as raw 32-bit little-endian bytes and opened as a memory stream.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use super::temp::TempResource;
use crate::config::Materialization;
use crate::engine::{Engine, FormatHandle, FormatHints};
use crate::error::Result;
use crate::format::{EncodingDescriptor, Sample, SignalDescriptor};
use crate::io::write_audio_file;

/// Strategy turning a sample buffer into an engine source handle
pub trait SourceMaterializer: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Produce a readable source holding `samples`
    fn materialize(
        &self,
        engine: &dyn Engine,
        samples: &[Sample],
        signal: &SignalDescriptor,
    ) -> Result<MaterializedSource>;
}

/// Engine source plus whatever backs it
#[derive(Debug)]
pub struct MaterializedSource {
    // Declared first: the handle must close before its backing file goes
    handle: FormatHandle,
    backing: Option<TempResource>,
}

impl MaterializedSource {
    pub fn handle_mut(&mut self) -> &mut FormatHandle {
        &mut self.handle
    }

    pub fn signal(&self) -> &SignalDescriptor {
        self.handle.signal()
    }

    /// Close the handle, then remove the backing file
    pub fn close(self) -> Result<()> {
        let Self { handle, backing } = self;
        let closed = handle.close();
        if let Some(backing) = backing {
            backing.remove()?;
        }
        closed
    }
}

/// Writes a temporary 32-bit WAV file and opens it for reading
#[derive(Debug, Default, Clone, Copy)]
pub struct TempFileSource;

impl SourceMaterializer for TempFileSource {
    fn name(&self) -> &'static str {
        "temp_file"
    }

    fn materialize(
        &self,
        engine: &dyn Engine,
        samples: &[Sample],
        signal: &SignalDescriptor,
    ) -> Result<MaterializedSource> {
        let backing = TempResource::new(engine.temp_path("wav"));
        let mut wav_signal = signal.clone();
        wav_signal.precision = 32;

        write_audio_file(
            engine,
            backing.path(),
            samples,
            &wav_signal,
            Some(&EncodingDescriptor::signed(32)),
            Some("wav"),
        )?;
        let handle = FormatHandle::open_read(
            engine,
            backing.path(),
            &FormatHints::new(None, None, Some("wav")),
        )?;
        debug!("Materialized {} samples at {}", samples.len(), backing.path().display());

        Ok(MaterializedSource {
            handle,
            backing: Some(backing),
        })
    }
}

/// Encodes raw 32-bit little-endian bytes and opens a memory stream
#[derive(Debug, Default, Clone, Copy)]
pub struct MemorySource;

impl SourceMaterializer for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn materialize(
        &self,
        engine: &dyn Engine,
        samples: &[Sample],
        signal: &SignalDescriptor,
    ) -> Result<MaterializedSource> {
        let mut bytes = vec![0u8; samples.len() * 4];
        LittleEndian::write_i32_into(samples, &mut bytes);

        let mut hint = signal.clone().with_length(samples.len() as u64);
        hint.precision = 32;
        let hints = FormatHints::new(Some(hint), Some(EncodingDescriptor::signed(32)), Some("s32"));

        let handle = FormatHandle::open_mem_read(engine, bytes, &hints)?;
        debug!("Materialized {} samples in memory", samples.len());

        Ok(MaterializedSource {
            handle,
            backing: None,
        })
    }
}

/// Pick the materializer for a strategy and engine
pub fn materializer_for(
    strategy: Materialization,
    engine: &dyn Engine,
) -> Box<dyn SourceMaterializer> {
    match strategy {
        Materialization::TempFile => Box::new(TempFileSource),
        Materialization::Memory => Box::new(MemorySource),
        Materialization::Auto => {
            if cfg!(target_os = "macos") || !engine.supports_memory_streams() {
                Box::new(TempFileSource)
            } else {
                Box::new(MemorySource)
            }
        }
    }
}
