//! Windowed file reads
//!
//! Offsets and counts are given in frames and converted to absolute sample
//! indices by multiplying by the channel count.

use std::path::Path;

use log::debug;

use crate::engine::{ensure_ready, Engine, FormatHandle, FormatHints};
use crate::error::{FlowError, Result};
use crate::format::{Audio, EncodingDescriptor, SignalDescriptor};

/// Options for `read_audio_file`
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Frames to read; 0 reads to end of stream
    pub frame_count: u64,
    /// Frames to skip before reading
    pub frame_offset: u64,
    pub signal_hint: Option<SignalDescriptor>,
    pub encoding_hint: Option<EncodingDescriptor>,
    /// Container type overriding the path extension
    pub file_type: Option<String>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(mut self, count: u64) -> Self {
        self.frame_count = count;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.frame_offset = offset;
        self
    }

    pub fn signal_hint(mut self, signal: SignalDescriptor) -> Self {
        self.signal_hint = Some(signal);
        self
    }

    pub fn encoding_hint(mut self, encoding: EncodingDescriptor) -> Self {
        self.encoding_hint = Some(encoding);
        self
    }

    pub fn file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    fn hints(&self) -> FormatHints {
        FormatHints::new(
            self.signal_hint.clone(),
            self.encoding_hint.clone(),
            self.file_type.as_deref(),
        )
    }
}

/// Read a window of frames from an audio file
pub fn read_audio_file(engine: &dyn Engine, path: &Path, options: &ReadOptions) -> Result<Audio> {
    ensure_ready(engine)?;
    let mut handle = FormatHandle::open_read(engine, path, &options.hints())?;
    let label = handle.label().to_string();

    let signal = handle.signal().clone();
    let channels = signal.channels.max(1) as u64;
    let total = signal
        .length
        .ok_or_else(|| FlowError::UnknownLength {
            path: label.clone(),
        })?;

    let offset = match options.frame_offset.checked_mul(channels) {
        Some(offset) if offset <= total => offset,
        _ => {
            return Err(FlowError::OffsetOutOfRange {
                path: label,
                offset: options.frame_offset.saturating_mul(channels),
                total,
            })
        }
    };
    // An overflowing count just means the rest of the stream
    let count = options.frame_count.saturating_mul(channels);

    let mut window = total;
    if offset > 0 {
        window = total - offset;
    }
    if count > 0 && count < window {
        window = count;
    }
    debug!(
        "Reading {} samples at offset {} from {} ({} total)",
        window, offset, label, total
    );

    let stream = handle.stream_mut()?;
    if stream.seek(offset).is_err() {
        return Err(FlowError::Seek {
            path: label,
            offset,
        });
    }

    let mut samples = vec![0; window as usize];
    let mut filled = 0;
    while filled < samples.len() {
        let n = stream.read(&mut samples[filled..]);
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Err(FlowError::EmptyRead { path: label });
    }
    samples.truncate(filled);

    handle.close()?;

    Ok(Audio {
        rate: signal.rate,
        channels: signal.channels,
        samples,
    })
}

/// Report the signal and encoding of an audio file
pub fn get_info(engine: &dyn Engine, path: &Path) -> Result<(SignalDescriptor, EncodingDescriptor)> {
    ensure_ready(engine)?;
    let handle = FormatHandle::open_read(engine, path, &FormatHints::default())?;
    let info = (handle.signal().clone(), handle.encoding().clone());
    handle.close()?;
    Ok(info)
}
