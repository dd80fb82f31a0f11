//! Encoding descriptor

use serde::{Deserialize, Serialize};

/// Sample encoding kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    Unknown,
    /// Two's complement signed integers
    Signed,
    Unsigned,
    /// IEEE floating point
    Float,
    FloatText,
    Flac,
    Ulaw,
    Alaw,
    ImaAdpcm,
    MsAdpcm,
    Gsm,
    Mp3,
    Vorbis,
}

impl EncodingKind {
    /// Whether samples of this kind are plain PCM values
    pub fn is_linear_pcm(&self) -> bool {
        matches!(
            self,
            EncodingKind::Signed | EncodingKind::Unsigned | EncodingKind::Float
        )
    }
}

/// Tri-state option: explicitly off, explicitly on, or engine default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionFlag {
    No,
    Yes,
    #[default]
    Default,
}

/// Byte and bit level representation of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingDescriptor {
    pub kind: EncodingKind,
    pub bits_per_sample: u32,
    #[serde(default)]
    pub compression: f64,
    #[serde(default)]
    pub reverse_bytes: OptionFlag,
    #[serde(default)]
    pub reverse_nibbles: OptionFlag,
    #[serde(default)]
    pub reverse_bits: OptionFlag,
    #[serde(default)]
    pub opposite_endian: bool,
}

impl EncodingDescriptor {
    /// Signed-integer defaults for the given precision
    pub fn signed(bits_per_sample: u32) -> Self {
        Self {
            kind: EncodingKind::Signed,
            bits_per_sample,
            compression: 0.0,
            reverse_bytes: OptionFlag::Default,
            reverse_nibbles: OptionFlag::Default,
            reverse_bits: OptionFlag::Default,
            opposite_endian: false,
        }
    }

    /// Same defaults with a different kind
    pub fn with_kind(mut self, kind: EncodingKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether multi-byte values should be stored big-endian
    pub fn big_endian(&self) -> bool {
        self.opposite_endian ^ (self.reverse_bytes == OptionFlag::Yes)
    }
}
