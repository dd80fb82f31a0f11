//! Whole-buffer file writes

use std::path::Path;

use log::debug;

use crate::engine::{ensure_ready, Engine, FormatHandle};
use crate::error::{FlowError, Result};
use crate::format::{EncodingDescriptor, Sample, SignalDescriptor};

/// Write an interleaved buffer, returning the number of samples written.
///
/// The container is taken from `file_type`, else from the path extension.
pub fn write_audio_file(
    engine: &dyn Engine,
    path: &Path,
    samples: &[Sample],
    signal: &SignalDescriptor,
    encoding: Option<&EncodingDescriptor>,
    file_type: Option<&str>,
) -> Result<usize> {
    ensure_ready(engine)?;
    signal.validate()?;

    let signal = signal.clone().with_length(samples.len() as u64);
    let mut handle = FormatHandle::open_write(engine, path, &signal, encoding, file_type)?;

    let written = handle.stream_mut()?.write(samples);
    if written != samples.len() {
        return Err(FlowError::ShortWrite {
            path: handle.label().to_string(),
            expected: samples.len(),
            written,
        });
    }

    handle.close()?;
    debug!("Wrote {} samples to {}", written, path.display());
    Ok(written)
}
