//! Headerless sample streams (files and memory buffers)

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use super::container::RawLayout;
use super::pcm;
use crate::engine::{AudioStream, EngineError, EngineResult};
use crate::format::{EncodingDescriptor, EncodingKind, Sample, SignalDescriptor};

/// Decode raw bytes into full-scale samples
pub fn decode(bytes: &[u8], layout: RawLayout) -> EngineResult<Vec<Sample>> {
    if layout.big_endian {
        decode_with::<BigEndian>(bytes, layout)
    } else {
        decode_with::<LittleEndian>(bytes, layout)
    }
}

fn decode_with<B: ByteOrder>(bytes: &[u8], layout: RawLayout) -> EngineResult<Vec<Sample>> {
    let width = layout.bytes_per_sample();
    if bytes.len() % width != 0 {
        return Err(EngineError::new(format!(
            "{} bytes is not a whole number of {}-byte samples",
            bytes.len(),
            width
        )));
    }

    let count = bytes.len() / width;
    let mut cursor = Cursor::new(bytes);
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let sample = match (layout.kind, layout.bits) {
            (EncodingKind::Signed, 8) => pcm::widen(cursor.read_i8()? as i64, 8),
            (EncodingKind::Signed, 16) => pcm::widen(cursor.read_i16::<B>()? as i64, 16),
            (EncodingKind::Signed, 24) => pcm::widen(cursor.read_i24::<B>()? as i64, 24),
            (EncodingKind::Signed, 32) => cursor.read_i32::<B>()?,
            (EncodingKind::Unsigned, 8) => pcm::widen(cursor.read_u8()? as i64 - 128, 8),
            (EncodingKind::Unsigned, 16) => {
                pcm::widen(cursor.read_u16::<B>()? as i64 - 32768, 16)
            }
            (EncodingKind::Float, 32) => pcm::from_float(cursor.read_f32::<B>()? as f64),
            (EncodingKind::Float, 64) => pcm::from_float(cursor.read_f64::<B>()?),
            (kind, bits) => {
                return Err(EngineError::new(format!(
                    "unsupported raw encoding: {:?} {}-bit",
                    kind, bits
                )))
            }
        };
        samples.push(sample);
    }
    Ok(samples)
}

/// Encode full-scale samples into raw bytes
pub fn encode<W: Write>(out: &mut W, sample: Sample, layout: RawLayout) -> std::io::Result<()> {
    if layout.big_endian {
        encode_with::<BigEndian, W>(out, sample, layout)
    } else {
        encode_with::<LittleEndian, W>(out, sample, layout)
    }
}

fn encode_with<B: ByteOrder, W: Write>(
    out: &mut W,
    sample: Sample,
    layout: RawLayout,
) -> std::io::Result<()> {
    match (layout.kind, layout.bits) {
        (EncodingKind::Signed, 8) => out.write_i8(pcm::narrow_to(sample, 8)),
        (EncodingKind::Signed, 16) => out.write_i16::<B>(pcm::narrow_to(sample, 16)),
        (EncodingKind::Signed, 24) => out.write_i24::<B>(pcm::narrow_to(sample, 24)),
        (EncodingKind::Signed, 32) => out.write_i32::<B>(sample),
        (EncodingKind::Unsigned, 8) => out.write_u8((pcm::narrow(sample, 8) + 128) as u8),
        (EncodingKind::Unsigned, 16) => out.write_u16::<B>((pcm::narrow(sample, 16) + 32768) as u16),
        (EncodingKind::Float, 32) => out.write_f32::<B>(pcm::to_float(sample) as f32),
        (EncodingKind::Float, 64) => out.write_f64::<B>(pcm::to_float(sample)),
        (kind, bits) => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unsupported raw encoding: {:?} {}-bit", kind, bits),
        )),
    }
}

/// Fully decoded headerless source
pub struct RawSource {
    samples: Vec<Sample>,
    position: usize,
    signal: SignalDescriptor,
    encoding: EncodingDescriptor,
}

impl RawSource {
    /// Decode a byte buffer; the signal hint supplies rate and channels
    pub fn from_bytes(
        bytes: &[u8],
        layout: RawLayout,
        signal_hint: Option<&SignalDescriptor>,
    ) -> EngineResult<Self> {
        let hint = signal_hint
            .ok_or_else(|| EngineError::new("headerless input needs a signal hint"))?;
        if hint.channels == 0 {
            return Err(EngineError::new("signal hint has zero channels"));
        }
        let samples = decode(bytes, layout)?;

        let signal = SignalDescriptor::new(hint.rate, hint.channels, layout.bits)
            .with_length(samples.len() as u64);

        Ok(Self {
            samples,
            position: 0,
            signal,
            encoding: layout.encoding(),
        })
    }

    pub fn open(
        path: &Path,
        layout: RawLayout,
        signal_hint: Option<&SignalDescriptor>,
    ) -> EngineResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, layout, signal_hint)
    }
}

impl AudioStream for RawSource {
    fn signal(&self) -> &SignalDescriptor {
        &self.signal
    }

    fn encoding(&self) -> &EncodingDescriptor {
        &self.encoding
    }

    fn seek(&mut self, offset: u64) -> EngineResult<()> {
        if offset > self.samples.len() as u64 {
            return Err(EngineError::new("end of stream"));
        }
        self.position = offset as usize;
        Ok(())
    }

    fn read(&mut self, buf: &mut [Sample]) -> usize {
        let available = &self.samples[self.position..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.position += count;
        count
    }

    fn write(&mut self, _buf: &[Sample]) -> usize {
        0
    }

    fn close(self: Box<Self>) -> EngineResult<()> {
        Ok(())
    }
}

/// Headerless file writer
pub struct RawSink {
    writer: Option<BufWriter<File>>,
    layout: RawLayout,
    signal: SignalDescriptor,
    encoding: EncodingDescriptor,
}

impl RawSink {
    pub fn create(path: &Path, signal: &SignalDescriptor, layout: RawLayout) -> EngineResult<Self> {
        let writer = BufWriter::new(File::create(path)?);
        let mut signal = signal.clone();
        signal.precision = layout.bits;
        signal.length = None;
        Ok(Self {
            writer: Some(writer),
            layout,
            signal,
            encoding: layout.encoding(),
        })
    }
}

impl AudioStream for RawSink {
    fn signal(&self) -> &SignalDescriptor {
        &self.signal
    }

    fn encoding(&self) -> &EncodingDescriptor {
        &self.encoding
    }

    fn seek(&mut self, _offset: u64) -> EngineResult<()> {
        Err(EngineError::new("cannot seek a raw writer"))
    }

    fn read(&mut self, _buf: &mut [Sample]) -> usize {
        0
    }

    fn write(&mut self, buf: &[Sample]) -> usize {
        let Some(writer) = self.writer.as_mut() else {
            return 0;
        };
        let mut count = 0;
        for &sample in buf {
            if let Err(e) = encode(writer, sample, self.layout) {
                debug!("Raw write stopped after {} samples: {}", count, e);
                break;
            }
            count += 1;
        }
        count
    }

    fn close(mut self: Box<Self>) -> EngineResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
