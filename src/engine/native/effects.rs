//! Built-in effects of the native engine
//!
//! Simple whole-buffer implementations:
//! - `rate`: linear-interpolation resampling
//! - `speed`: tempo and pitch change by relabelling the rate
//! - `channels`: averaging down-mix / duplicating up-mix
//! - `remix`: explicit per-output channel mixing
//! - `vol`, `gain`: amplitude scaling
//! - `trim`, `reverse`: editing

use crate::effects::{parse_channel_count, parse_db, parse_frequency, parse_seconds};
use crate::engine::{Effect, EffectInfo, EffectRegistry, EngineError, EngineResult};
use crate::format::{Sample, SignalDescriptor};

// ============================================================================
// Registration
// ============================================================================

/// Register every built-in effect
pub fn register_builtins(registry: &mut EffectRegistry) {
    registry.register(
        EffectInfo::new(
            "rate",
            "[-q|-l|-m|-h|-v] [RATE[k]]",
            "Change the sample rate",
        ),
        || Box::new(Rate::default()),
    );
    registry.register(
        EffectInfo::new("speed", "FACTOR[c]", "Change tempo and pitch together"),
        || Box::new(Speed::default()),
    );
    registry.register(
        EffectInfo::new("channels", "[CHANNELS]", "Change the number of channels"),
        || Box::new(Channels::default()),
    );
    registry.register(
        EffectInfo::new(
            "remix",
            "OUT-SPEC...  (OUT-SPEC: - | 0 | IN[vGAIN][,IN[vGAIN]]...)",
            "Mix input channels into output channels",
        ),
        || Box::new(Remix::default()),
    );
    registry.register(
        EffectInfo::new(
            "vol",
            "GAIN [amplitude|power|dB]",
            "Scale the volume by a factor or in dB",
        ),
        || Box::new(Vol::default()),
    );
    registry.register(
        EffectInfo::new("gain", "[-n] [dB]", "Apply gain in dB, optionally normalizing"),
        || Box::new(Gain::default()),
    );
    registry.register(
        EffectInfo::new("trim", "START [LENGTH]", "Keep a section of the audio"),
        || Box::new(Trim::default()),
    );
    registry.register(
        EffectInfo::new("reverse", "", "Play the audio backwards"),
        || Box::new(Reverse::default()),
    );
}

// ============================================================================
// Helpers
// ============================================================================

fn usage(effect: &str, message: impl std::fmt::Display) -> EngineError {
    EngineError::new(format!("{}: {}", effect, message))
}

#[inline]
fn saturate(value: f64) -> Sample {
    value.round().clamp(i32::MIN as f64, i32::MAX as f64) as Sample
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
fn deinterleave(samples: &[Sample], channels: usize) -> Vec<Vec<Sample>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];
    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }
    result
}

/// Interleave channels from [[L,L,...], [R,R,...]] to [L,R,L,R,...]
fn interleave(channels: &[Vec<Sample>]) -> Vec<Sample> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };
    let frames = first.len();
    let mut result = Vec::with_capacity(frames * channels.len());
    for frame in 0..frames {
        for channel in channels {
            result.push(channel[frame]);
        }
    }
    result
}

/// Linear interpolation resampling of one channel
fn resample_linear(samples: &[Sample], ratio: f64) -> Vec<Sample> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).round().max(1.0) as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = src_pos - src_idx as f64;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] as f64 * (1.0 - frac) + samples[src_idx + 1] as f64 * frac
        } else {
            samples[source_len - 1] as f64
        };
        output.push(saturate(sample));
    }

    output
}

// ============================================================================
// rate
// ============================================================================

const RATE_QUALITY_FLAGS: &[&str] = &["-q", "-l", "-m", "-h", "-v", "-s", "-I", "-M", "-L"];

/// Sample rate change
#[derive(Debug, Default)]
pub struct Rate {
    requested: Option<f64>,
    input_rate: f64,
    output_rate: f64,
    channels: usize,
}

impl Effect for Rate {
    fn name(&self) -> &str {
        "rate"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        let mut positional = Vec::new();
        for arg in args {
            if RATE_QUALITY_FLAGS.contains(&arg.as_str()) {
                continue;
            }
            if arg.starts_with('-') && parse_frequency(arg).is_none() {
                return Err(usage("rate", format!("unknown option '{}'", arg)));
            }
            positional.push(arg);
        }
        match positional.as_slice() {
            [] => self.requested = None,
            [rate] => {
                self.requested = Some(
                    parse_frequency(rate)
                        .ok_or_else(|| usage("rate", format!("invalid rate '{}'", rate)))?,
                )
            }
            _ => return Err(usage("rate", "expected at most one rate")),
        }
        Ok(())
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        self.input_rate = input.rate;
        // Native containers store whole hertz
        self.output_rate = self.requested.unwrap_or(target.rate).round().max(1.0);
        self.channels = input.channels as usize;

        let ratio = self.output_rate / self.input_rate;
        let mut output = input.clone();
        output.rate = self.output_rate;
        output.length = input.frames().map(|frames| {
            let out_frames = match frames {
                0 => 0,
                n => ((n as f64 * ratio).round() as u64).max(1),
            };
            out_frames * input.channels as u64
        });
        Ok(output)
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        if self.channels == 0 || self.input_rate <= 0.0 {
            return Err(usage("rate", "effect was not connected"));
        }
        if (self.output_rate - self.input_rate).abs() < f64::EPSILON {
            return Ok(samples);
        }
        let ratio = self.output_rate / self.input_rate;
        let resampled: Vec<Vec<Sample>> = deinterleave(&samples, self.channels)
            .iter()
            .map(|channel| resample_linear(channel, ratio))
            .collect();
        Ok(interleave(&resampled))
    }
}

/// Speed change. Samples pass through untouched and the output is labelled
/// with the scaled rate; a following `rate` brings it back to a playable rate.
#[derive(Debug)]
pub struct Speed {
    factor: f64,
}

impl Default for Speed {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

fn parse_speed(arg: &str) -> Option<f64> {
    let arg = arg.trim();
    let factor = match arg.strip_suffix('c') {
        Some(cents) => 2f64.powf(cents.parse::<f64>().ok()? / 1200.0),
        None => arg.parse::<f64>().ok()?,
    };
    (factor.is_finite() && factor > 0.0).then_some(factor)
}

impl Effect for Speed {
    fn name(&self) -> &str {
        "speed"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        match args {
            [factor] => {
                self.factor = parse_speed(factor)
                    .ok_or_else(|| usage("speed", format!("invalid factor '{}'", factor)))?;
                Ok(())
            }
            _ => Err(usage("speed", "expected FACTOR[c]")),
        }
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        _target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        let mut output = input.clone();
        output.rate = (input.rate * self.factor).round().max(1.0);
        Ok(output)
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        Ok(samples)
    }
}

// ============================================================================
// channels
// ============================================================================

/// Channel count change
#[derive(Debug, Default)]
pub struct Channels {
    requested: Option<u32>,
    input_channels: usize,
    output_channels: usize,
}

impl Effect for Channels {
    fn name(&self) -> &str {
        "channels"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        self.requested = match args {
            [] => None,
            [count] => Some(
                parse_channel_count(count)
                    .ok_or_else(|| usage("channels", format!("invalid count '{}'", count)))?,
            ),
            _ => return Err(usage("channels", "expected at most one argument")),
        };
        Ok(())
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        self.input_channels = input.channels as usize;
        self.output_channels = self.requested.unwrap_or(target.channels) as usize;

        let mut output = input.clone();
        output.channels = self.output_channels as u32;
        output.length = input
            .frames()
            .map(|frames| frames * self.output_channels as u64);
        Ok(output)
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        let (inputs, outputs) = (self.input_channels, self.output_channels);
        if inputs == 0 || outputs == 0 {
            return Err(usage("channels", "effect was not connected"));
        }
        if inputs == outputs {
            return Ok(samples);
        }

        let frames = samples.len() / inputs;
        let mut result = Vec::with_capacity(frames * outputs);
        for frame in samples.chunks_exact(inputs) {
            for out in 0..outputs {
                if outputs < inputs {
                    // Average every input channel folded onto this output
                    let (sum, n) = frame
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| i % outputs == out)
                        .fold((0.0, 0), |(sum, n), (_, s)| (sum + *s as f64, n + 1));
                    result.push(saturate(sum / n as f64));
                } else {
                    result.push(frame[out % inputs]);
                }
            }
        }
        Ok(result)
    }
}

/// One output channel of `remix`
#[derive(Debug, Clone, PartialEq)]
enum MixSpec {
    /// `-`: average of every input channel
    All,
    /// 1-based input channels with optional gains; empty is silence
    Inputs(Vec<(usize, Option<f64>)>),
}

fn parse_mix_spec(arg: &str) -> Option<MixSpec> {
    match arg.trim() {
        "-" => Some(MixSpec::All),
        "0" => Some(MixSpec::Inputs(Vec::new())),
        list => list
            .split(',')
            .map(|part| {
                let (channel, gain) = match part.split_once('v') {
                    Some((channel, gain)) => (channel, Some(gain.parse::<f64>().ok()?)),
                    None => (part, None),
                };
                let channel = channel.parse::<usize>().ok().filter(|c| *c >= 1)?;
                Some((channel, gain))
            })
            .collect::<Option<Vec<_>>>()
            .map(MixSpec::Inputs),
    }
}

/// Explicit channel mixing, one argument per output channel.
///
/// Channels listed without a gain share `1/n` of the output.
#[derive(Debug, Default)]
pub struct Remix {
    specs: Vec<MixSpec>,
    input_channels: usize,
    weights: Vec<Vec<(usize, f64)>>,
}

impl Effect for Remix {
    fn name(&self) -> &str {
        "remix"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        if args.is_empty() {
            return Err(usage("remix", "expected at least one output channel"));
        }
        self.specs = args
            .iter()
            .map(|arg| {
                parse_mix_spec(arg)
                    .ok_or_else(|| usage("remix", format!("invalid output spec '{}'", arg)))
            })
            .collect::<EngineResult<_>>()?;
        Ok(())
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        _target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        let inputs = input.channels as usize;
        let mut weights = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            let out = match spec {
                MixSpec::All => (0..inputs).map(|c| (c, 1.0 / inputs as f64)).collect(),
                MixSpec::Inputs(list) => {
                    let share = 1.0 / list.len().max(1) as f64;
                    let mut out = Vec::with_capacity(list.len());
                    for (channel, gain) in list {
                        if *channel > inputs {
                            return Err(usage(
                                "remix",
                                format!("input has no channel {} ({} channels)", channel, inputs),
                            ));
                        }
                        out.push((channel - 1, gain.unwrap_or(share)));
                    }
                    out
                }
            };
            weights.push(out);
        }
        self.input_channels = inputs;
        self.weights = weights;

        let mut output = input.clone();
        output.channels = self.weights.len() as u32;
        output.length = input
            .frames()
            .map(|frames| frames * self.weights.len() as u64);
        Ok(output)
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        if self.input_channels == 0 {
            return Err(usage("remix", "effect was not connected"));
        }
        let frames = samples.len() / self.input_channels;
        let mut result = Vec::with_capacity(frames * self.weights.len());
        for frame in samples.chunks_exact(self.input_channels) {
            for out in &self.weights {
                let mixed: f64 = out.iter().map(|(c, w)| frame[*c] as f64 * w).sum();
                result.push(saturate(mixed));
            }
        }
        Ok(result)
    }
}

// ============================================================================
// vol / gain
// ============================================================================

/// Volume scaling by amplitude factor, power factor or dB
#[derive(Debug)]
pub struct Vol {
    factor: f64,
}

impl Default for Vol {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl Effect for Vol {
    fn name(&self) -> &str {
        "vol"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        let (value, kind) = match args {
            [value] => (value.as_str(), None),
            [value, kind] => (value.as_str(), Some(kind.as_str())),
            _ => return Err(usage("vol", "expected GAIN [amplitude|power|dB]")),
        };

        let is_db = value.ends_with("dB") || value.ends_with("db");
        self.factor = match (kind, is_db) {
            (Some("dB") | Some("db"), _) | (None, true) => {
                let db = parse_db(value).ok_or_else(|| usage("vol", "invalid dB value"))?;
                10f64.powf(db / 20.0)
            }
            (Some("power"), false) => {
                let power: f64 = value
                    .parse()
                    .map_err(|_| usage("vol", format!("invalid power '{}'", value)))?;
                if power < 0.0 {
                    return Err(usage("vol", "power must not be negative"));
                }
                power.sqrt()
            }
            (Some("amplitude") | None, false) => value
                .parse()
                .map_err(|_| usage("vol", format!("invalid gain '{}'", value)))?,
            (Some(other), _) => return Err(usage("vol", format!("unknown gain type '{}'", other))),
        };
        Ok(())
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        let factor = self.factor;
        Ok(samples
            .into_iter()
            .map(|s| saturate(s as f64 * factor))
            .collect())
    }
}

/// Gain in dB; with `-n` the peak is first normalized to 0 dBFS
#[derive(Debug, Default)]
pub struct Gain {
    db: f64,
    normalize: bool,
}

impl Effect for Gain {
    fn name(&self) -> &str {
        "gain"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        self.normalize = false;
        self.db = 0.0;
        for arg in args {
            if arg == "-n" {
                self.normalize = true;
            } else {
                self.db = parse_db(arg)
                    .ok_or_else(|| usage("gain", format!("invalid gain '{}'", arg)))?;
            }
        }
        Ok(())
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        let mut factor = 10f64.powf(self.db / 20.0);
        if self.normalize {
            let peak = samples
                .iter()
                .map(|s| (*s as f64).abs())
                .fold(0.0, f64::max);
            if peak > 0.0 {
                factor *= i32::MAX as f64 / peak;
            }
        }
        Ok(samples
            .into_iter()
            .map(|s| saturate(s as f64 * factor))
            .collect())
    }
}

// ============================================================================
// trim / reverse
// ============================================================================

/// Keep `LENGTH` seconds starting at `START`
#[derive(Debug, Default)]
pub struct Trim {
    start_secs: f64,
    length_secs: Option<f64>,
    rate: f64,
    channels: usize,
}

impl Effect for Trim {
    fn name(&self) -> &str {
        "trim"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        let parse = |arg: &String| {
            parse_seconds(arg).ok_or_else(|| usage("trim", format!("invalid position '{}'", arg)))
        };
        match args {
            [start] => {
                self.start_secs = parse(start)?;
                self.length_secs = None;
            }
            [start, length] => {
                self.start_secs = parse(start)?;
                self.length_secs = Some(parse(length)?);
            }
            _ => return Err(usage("trim", "expected START [LENGTH]")),
        }
        Ok(())
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        _target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        self.rate = input.rate;
        self.channels = input.channels as usize;
        let mut output = input.clone();
        output.length = None;
        Ok(output)
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        if self.channels == 0 {
            return Err(usage("trim", "effect was not connected"));
        }
        let frames = samples.len() / self.channels;
        let start = ((self.start_secs * self.rate).round() as usize).min(frames);
        let end = match self.length_secs {
            Some(length) => start
                .saturating_add((length * self.rate).round() as usize)
                .min(frames),
            None => frames,
        };
        Ok(samples[start * self.channels..end * self.channels].to_vec())
    }
}

/// Reverse frame order
#[derive(Debug, Default)]
pub struct Reverse {
    channels: usize,
}

impl Effect for Reverse {
    fn name(&self) -> &str {
        "reverse"
    }

    fn configure(&mut self, args: &[String]) -> EngineResult<()> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(usage("reverse", "takes no arguments"))
        }
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        _target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        self.channels = input.channels as usize;
        Ok(input.clone())
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        let channels = self.channels.max(1);
        Ok(samples
            .chunks_exact(channels)
            .rev()
            .flatten()
            .copied()
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn mono(rate: f64) -> SignalDescriptor {
        SignalDescriptor::new(rate, 1, 32)
    }

    #[test]
    fn test_rate_last_argument_is_rate() {
        let mut rate = Rate::default();
        rate.configure(&args(&["-q", "16000"])).unwrap();
        let out = rate.connect(&mono(8000.0).with_length(8000), &mono(8000.0)).unwrap();
        assert_eq!(out.rate, 16000.0);
        assert_eq!(out.length, Some(16000));
    }

    #[test]
    fn test_rate_without_argument_uses_target() {
        let mut rate = Rate::default();
        rate.configure(&[]).unwrap();
        let out = rate.connect(&mono(8000.0), &mono(22050.0)).unwrap();
        assert_eq!(out.rate, 22050.0);
    }

    #[test]
    fn test_rate_rejects_garbage() {
        assert!(Rate::default().configure(&args(&["fast"])).is_err());
        assert!(Rate::default().configure(&args(&["-x", "16000"])).is_err());
        assert!(Rate::default().configure(&args(&["8000", "16000"])).is_err());
    }

    #[test]
    fn test_rate_doubles_length() {
        let mut rate = Rate::default();
        rate.configure(&args(&["16000"])).unwrap();
        rate.connect(&mono(8000.0), &mono(8000.0)).unwrap();
        let out = rate.process(vec![0, 100, 200, 300]).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(out[1], 50);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let samples = vec![0, 50, 100, 50, 0, -50, -100, -50];
        let resampled = resample_linear(&samples, 0.5);
        assert_eq!(resampled.len(), 4);
        assert_eq!(resampled[1], 100);
    }

    #[test]
    fn test_channels_downmix_averages() {
        let mut channels = Channels::default();
        channels.configure(&args(&["1"])).unwrap();
        let stereo = SignalDescriptor::new(8000.0, 2, 32).with_length(4);
        let out = channels.connect(&stereo, &stereo).unwrap();
        assert_eq!(out.channels, 1);
        assert_eq!(out.length, Some(2));

        let result = channels.process(vec![100, 300, -10, 10]).unwrap();
        assert_eq!(result, vec![200, 0]);
    }

    #[test]
    fn test_channels_upmix_duplicates() {
        let mut channels = Channels::default();
        channels.configure(&args(&["2"])).unwrap();
        channels.connect(&mono(8000.0), &mono(8000.0)).unwrap();
        let result = channels.process(vec![1, 2]).unwrap();
        assert_eq!(result, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_vol_variants() {
        let mut vol = Vol::default();
        vol.configure(&args(&["0.5"])).unwrap();
        assert_eq!(vol.process(vec![1000, -1000]).unwrap(), vec![500, -500]);

        vol.configure(&args(&["-6.0206", "dB"])).unwrap();
        let out = vol.process(vec![1_000_000]).unwrap();
        assert!((out[0] - 500_000).abs() < 10);

        vol.configure(&args(&["0.25", "power"])).unwrap();
        assert_eq!(vol.process(vec![1000]).unwrap(), vec![500]);

        assert!(vol.configure(&args(&["1", "loudness"])).is_err());
        assert!(vol.configure(&[]).is_err());
    }

    #[test]
    fn test_gain_saturates() {
        let mut gain = Gain::default();
        gain.configure(&args(&["20"])).unwrap();
        let out = gain.process(vec![i32::MAX / 2, i32::MIN / 2]).unwrap();
        assert_eq!(out, vec![i32::MAX, i32::MIN]);
    }

    #[test]
    fn test_gain_normalize() {
        let mut gain = Gain::default();
        gain.configure(&args(&["-n"])).unwrap();
        let out = gain.process(vec![1 << 20, -(1 << 19)]).unwrap();
        assert_eq!(out[0], i32::MAX);
    }

    #[test]
    fn test_speed_relabels_rate() {
        let mut speed = Speed::default();
        speed.configure(&args(&["2"])).unwrap();
        let out = speed.connect(&mono(8000.0), &mono(8000.0)).unwrap();
        assert_eq!(out.rate, 16000.0);
        assert_eq!(speed.process(vec![1, 2, 3]).unwrap(), vec![1, 2, 3]);

        speed.configure(&args(&["1200c"])).unwrap();
        let out = speed.connect(&mono(8000.0), &mono(8000.0)).unwrap();
        assert!((out.rate - 16000.0).abs() < 1e-6);

        assert!(speed.configure(&args(&["0"])).is_err());
        assert!(speed.configure(&args(&[])).is_err());
    }

    #[test]
    fn test_remix_mixes_and_reorders() {
        let stereo = SignalDescriptor::new(8000.0, 2, 32);
        let mut remix = Remix::default();
        remix.configure(&args(&["2", "1,2", "0", "1v0.5"])).unwrap();
        let out = remix.connect(&stereo, &stereo).unwrap();
        assert_eq!(out.channels, 4);
        assert_eq!(
            remix.process(vec![100, 300, 10, 30]).unwrap(),
            vec![300, 200, 0, 50, 30, 20, 0, 5]
        );
    }

    #[test]
    fn test_remix_rejects_missing_channel() {
        let mut remix = Remix::default();
        assert!(remix.configure(&args(&["1,x"])).is_err());
        remix.configure(&args(&["3"])).unwrap();
        let stereo = SignalDescriptor::new(8000.0, 2, 32);
        assert!(remix.connect(&stereo, &stereo).is_err());
    }

    #[test]
    fn test_trim_window() {
        let mut trim = Trim::default();
        trim.configure(&args(&["0.5", "0.25"])).unwrap();
        trim.connect(&mono(8.0), &mono(8.0)).unwrap();
        let out = trim.process((0..16).collect()).unwrap();
        assert_eq!(out, vec![4, 5]);
    }

    #[test]
    fn test_trim_huge_length_runs_to_end() {
        let mut trim = Trim::default();
        trim.configure(&args(&["0.5", "1e30"])).unwrap();
        trim.connect(&mono(8.0), &mono(8.0)).unwrap();
        let out = trim.process((0..16).collect()).unwrap();
        assert_eq!(out, (4..16).collect::<Vec<Sample>>());
    }

    #[test]
    fn test_reverse() {
        let mut reverse = Reverse::default();
        assert!(reverse.configure(&args(&["1"])).is_err());
        let stereo = SignalDescriptor::new(8000.0, 2, 32);
        reverse.connect(&stereo, &stereo).unwrap();
        assert_eq!(
            reverse.process(vec![1, 2, 3, 4, 5, 6]).unwrap(),
            vec![5, 6, 3, 4, 1, 2]
        );
    }

    #[test]
    fn test_builtins_registered() {
        let mut registry = EffectRegistry::new();
        register_builtins(&mut registry);
        for name in ["rate", "channels", "vol", "gain", "trim", "reverse"] {
            assert!(registry.contains(name), "missing {}", name);
        }
    }
}
