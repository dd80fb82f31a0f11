//! WAV container streams backed by `hound`

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use super::pcm;
use crate::engine::{AudioStream, EngineError, EngineResult};
use crate::format::{EncodingDescriptor, EncodingKind, Sample, SignalDescriptor};

/// Decoding session over a WAV file
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    signal: SignalDescriptor,
    encoding: EncodingDescriptor,
    format: SampleFormat,
    bits: u32,
}

impl WavSource {
    pub fn open(path: &Path) -> EngineResult<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        let bits = spec.bits_per_sample as u32;

        let kind = match spec.sample_format {
            SampleFormat::Float => EncodingKind::Float,
            SampleFormat::Int if bits == 8 => EncodingKind::Unsigned,
            SampleFormat::Int => EncodingKind::Signed,
        };

        let signal = SignalDescriptor::new(spec.sample_rate as f64, spec.channels as u32, bits)
            .with_length(reader.len() as u64);

        Ok(Self {
            reader,
            signal,
            encoding: EncodingDescriptor::signed(bits).with_kind(kind),
            format: spec.sample_format,
            bits,
        })
    }
}

impl AudioStream for WavSource {
    fn signal(&self) -> &SignalDescriptor {
        &self.signal
    }

    fn encoding(&self) -> &EncodingDescriptor {
        &self.encoding
    }

    fn seek(&mut self, offset: u64) -> EngineResult<()> {
        let total = self.signal.length.unwrap_or(0);
        let channels = self.signal.channels as u64;
        if offset > total {
            return Err(EngineError::new("end of stream"));
        }
        if offset % channels != 0 {
            return Err(EngineError::new(format!(
                "offset {} is not aligned to a {}-channel frame",
                offset, channels
            )));
        }
        self.reader.seek((offset / channels) as u32)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [Sample]) -> usize {
        let mut count = 0;
        match self.format {
            SampleFormat::Float => {
                for (slot, sample) in buf.iter_mut().zip(self.reader.samples::<f32>()) {
                    match sample {
                        Ok(v) => *slot = pcm::from_float(v as f64),
                        Err(e) => {
                            debug!("WAV float read stopped after {} samples: {}", count, e);
                            break;
                        }
                    }
                    count += 1;
                }
            }
            SampleFormat::Int => {
                let bits = self.bits;
                for (slot, sample) in buf.iter_mut().zip(self.reader.samples::<i32>()) {
                    match sample {
                        Ok(v) => *slot = pcm::widen(v as i64, bits),
                        Err(e) => {
                            debug!("WAV read stopped after {} samples: {}", count, e);
                            break;
                        }
                    }
                    count += 1;
                }
            }
        }
        count
    }

    fn write(&mut self, _buf: &[Sample]) -> usize {
        0
    }

    fn close(self: Box<Self>) -> EngineResult<()> {
        Ok(())
    }
}

/// Encoding session producing a WAV file
pub struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    signal: SignalDescriptor,
    encoding: EncodingDescriptor,
}

impl WavSink {
    pub fn create(
        path: &Path,
        signal: &SignalDescriptor,
        encoding: Option<&EncodingDescriptor>,
    ) -> EngineResult<Self> {
        let encoding = match encoding {
            Some(e) if e.bits_per_sample > 0 => e.clone(),
            Some(e) => {
                let mut e = e.clone();
                e.bits_per_sample = signal.precision;
                e
            }
            None => EncodingDescriptor::signed(signal.precision),
        };
        let bits = encoding.bits_per_sample;

        let sample_format = match encoding.kind {
            EncodingKind::Float if bits == 32 => SampleFormat::Float,
            EncodingKind::Signed if matches!(bits, 8 | 16 | 24 | 32) => SampleFormat::Int,
            EncodingKind::Unsigned if bits == 8 => SampleFormat::Int,
            kind => {
                return Err(EngineError::new(format!(
                    "WAV cannot store {:?} {}-bit samples",
                    kind, bits
                )))
            }
        };

        if signal.channels == 0 || signal.channels > u16::MAX as u32 {
            return Err(EngineError::new(format!(
                "invalid channel count {}",
                signal.channels
            )));
        }

        // WAV headers hold whole hertz; report what reaches the file
        let sample_rate = signal.rate.round();
        if !(1.0..=u32::MAX as f64).contains(&sample_rate) {
            return Err(EngineError::new(format!("invalid sample rate {}", signal.rate)));
        }

        let spec = WavSpec {
            channels: signal.channels as u16,
            sample_rate: sample_rate as u32,
            bits_per_sample: bits as u16,
            sample_format,
        };
        let writer = WavWriter::create(path, spec)?;

        let mut signal = signal.clone();
        signal.rate = sample_rate;
        signal.precision = bits;
        signal.length = None;

        Ok(Self {
            writer: Some(writer),
            signal,
            encoding,
        })
    }
}

impl AudioStream for WavSink {
    fn signal(&self) -> &SignalDescriptor {
        &self.signal
    }

    fn encoding(&self) -> &EncodingDescriptor {
        &self.encoding
    }

    fn seek(&mut self, _offset: u64) -> EngineResult<()> {
        Err(EngineError::new("cannot seek a WAV writer"))
    }

    fn read(&mut self, _buf: &mut [Sample]) -> usize {
        0
    }

    fn write(&mut self, buf: &[Sample]) -> usize {
        let Some(writer) = self.writer.as_mut() else {
            return 0;
        };
        let bits = self.encoding.bits_per_sample;
        let float = self.encoding.kind == EncodingKind::Float;

        let mut count = 0;
        for &sample in buf {
            let written = if float {
                writer.write_sample(pcm::to_float(sample) as f32)
            } else {
                match bits {
                    8 => writer.write_sample(pcm::narrow_to::<i8>(sample, 8)),
                    16 => writer.write_sample(pcm::narrow_to::<i16>(sample, 16)),
                    _ => writer.write_sample(pcm::narrow_to::<i32>(sample, bits)),
                }
            };
            if let Err(e) = written {
                debug!("WAV write stopped after {} samples: {}", count, e);
                break;
            }
            count += 1;
        }
        count
    }

    fn close(mut self: Box<Self>) -> EngineResult<()> {
        match self.writer.take() {
            Some(writer) => writer.finalize().map_err(EngineError::from),
            None => Ok(()),
        }
    }
}
