//! Container type detection

use std::path::Path;

use crate::engine::{EngineError, EngineResult};
use crate::format::{EncodingDescriptor, EncodingKind};

/// Layout of headerless sample data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLayout {
    pub kind: EncodingKind,
    pub bits: u32,
    pub big_endian: bool,
}

impl RawLayout {
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits / 8) as usize
    }

    fn validate(self) -> EngineResult<Self> {
        let supported = match self.kind {
            EncodingKind::Signed => matches!(self.bits, 8 | 16 | 24 | 32),
            EncodingKind::Unsigned => matches!(self.bits, 8 | 16),
            EncodingKind::Float => matches!(self.bits, 32 | 64),
            _ => false,
        };
        if supported {
            Ok(self)
        } else {
            Err(EngineError::new(format!(
                "unsupported raw encoding: {:?} {}-bit",
                self.kind, self.bits
            )))
        }
    }

    /// Encoding descriptor describing this layout
    pub fn encoding(&self) -> EncodingDescriptor {
        let mut encoding = EncodingDescriptor::signed(self.bits).with_kind(self.kind);
        encoding.opposite_endian = self.big_endian;
        encoding
    }
}

/// Containers the native engine understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    Wav,
    Raw(RawLayout),
}

impl FileType {
    /// Resolve the container from an explicit type name or the path extension.
    ///
    /// `raw` takes its layout from the encoding hint.
    pub fn detect(
        file_type: Option<&str>,
        path: Option<&Path>,
        encoding: Option<&EncodingDescriptor>,
    ) -> EngineResult<Self> {
        let name = match file_type {
            Some(name) => name.to_ascii_lowercase(),
            None => path
                .and_then(|p| p.extension())
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
                .ok_or_else(|| EngineError::new("cannot determine file type"))?,
        };
        let big_endian = encoding.map(|e| e.big_endian()).unwrap_or(false);

        let layout = |kind, bits| {
            RawLayout {
                kind,
                bits,
                big_endian,
            }
            .validate()
            .map(FileType::Raw)
        };

        match name.as_str() {
            "wav" | "wave" => Ok(FileType::Wav),
            "s8" | "sb" => layout(EncodingKind::Signed, 8),
            "s16" | "sw" => layout(EncodingKind::Signed, 16),
            "s24" => layout(EncodingKind::Signed, 24),
            "s32" | "sl" => layout(EncodingKind::Signed, 32),
            "u8" | "ub" => layout(EncodingKind::Unsigned, 8),
            "u16" | "uw" => layout(EncodingKind::Unsigned, 16),
            "f32" => layout(EncodingKind::Float, 32),
            "f64" => layout(EncodingKind::Float, 64),
            "raw" => {
                let encoding = encoding
                    .ok_or_else(|| EngineError::new("raw files need an encoding hint"))?;
                layout(encoding.kind, encoding.bits_per_sample)
            }
            other => Err(EngineError::new(format!("unsupported file type: {}", other))),
        }
    }
}
