//! Signal descriptor and decoded audio

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// One interleaved sample, full-scale 32-bit signed.
///
/// Narrower sources are left-aligned: a 16-bit value `v` is stored as `v << 16`.
pub type Sample = i32;

/// Format metadata for a raw sample stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    /// Sampling rate in Hz
    pub rate: f64,
    /// Number of interleaved channels (at least 1)
    pub channels: u32,
    /// Bits of precision per sample
    pub precision: u32,
    /// Total length in samples (all channels), `None` when unknown
    #[serde(default)]
    pub length: Option<u64>,
}

impl SignalDescriptor {
    /// Create a descriptor with an unspecified length
    pub fn new(rate: f64, channels: u32, precision: u32) -> Self {
        Self {
            rate,
            channels,
            precision,
            length: None,
        }
    }

    /// Same descriptor with a known total length
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Check the invariants every engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.channels < 1 {
            return Err(FlowError::InvalidDescriptor {
                reason: format!("channel count must be at least 1, got {}", self.channels),
            });
        }
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(FlowError::InvalidDescriptor {
                reason: format!("sample rate must be positive, got {}", self.rate),
            });
        }
        if self.precision == 0 || self.precision > 64 {
            return Err(FlowError::InvalidDescriptor {
                reason: format!("precision must be 1..=64 bits, got {}", self.precision),
            });
        }
        Ok(())
    }

    /// Total number of frames, when the length is known
    pub fn frames(&self) -> Option<u64> {
        self.length.map(|len| len / self.channels.max(1) as u64)
    }

    /// Whether two descriptors agree on stream shape (rate and channels)
    pub fn same_shape(&self, other: &SignalDescriptor) -> bool {
        self.channels == other.channels && (self.rate - other.rate).abs() < 1e-6
    }
}

/// Decoded audio returned by reads and effect flows
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    /// Sampling rate in Hz
    pub rate: f64,
    /// Number of interleaved channels
    pub channels: u32,
    /// Interleaved samples
    pub samples: Vec<Sample>,
}

impl Audio {
    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.rate <= 0.0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.rate
    }
}
