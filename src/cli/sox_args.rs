//! sox-style argument parsing
//!
//! Accepts the single-input, single-output subset of the `sox` command line:
//!
//! ```text
//! [global options] [input options] infile [output options] outfile [effect [args]]...
//! ```
//!
//! Effects start at the first argument naming a known effect. Everything
//! before that is split into option groups, each terminated by a file name.

use log::{debug, warn};

use crate::effects::{parse_channel_count, parse_frequency, EffectSpec, CHANNELS_EFFECT, RATE_EFFECT};
use crate::error::{FlowError, Result};
use crate::format::SignalDescriptor;

/// File name standing for "no file" on the output side
pub const PIPE: &str = "-";

/// Options that never take a value and are accepted but ignored
const GLOBAL_OPTIONS: &[&str] = &["-D", "-G", "-V0", "-V1", "-V2", "-V3"];

/// Options that are accepted and ignored wherever they appear
const IGNORED_OPTIONS: &[&str] = &["--ignore-length"];

/// Precision used for input buffers when `-b` is absent
const DEFAULT_PRECISION: u32 = 32;

/// One file and the options that precede it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileArgs {
    pub path: String,
    pub rate: Option<f64>,
    pub channels: Option<u32>,
    pub precision: Option<u32>,
    pub file_type: Option<String>,
}

impl FileArgs {
    pub fn is_pipe(&self) -> bool {
        self.path == PIPE
    }
}

/// Parsed sox-style command line
#[derive(Debug, Clone, PartialEq)]
pub struct SoxArgs {
    pub global_options: Vec<String>,
    pub input: FileArgs,
    pub output: FileArgs,
    /// Effects in command-line order, each split at a known effect name
    pub effects: Vec<EffectSpec>,
}

/// Effect list and output shape derived from a `SoxArgs`
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPlan {
    pub effects: Vec<EffectSpec>,
    pub target: SignalDescriptor,
}

enum Token {
    Flag(String, Option<String>),
    File(String),
}

fn tokenize(io_args: &[String]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < io_args.len() {
        let arg = &io_args[i];
        if arg != PIPE && arg.starts_with('-') {
            let takes_value = i + 1 < io_args.len()
                && !io_args[i + 1].starts_with('-')
                && !GLOBAL_OPTIONS.contains(&arg.as_str())
                && !IGNORED_OPTIONS.contains(&arg.as_str());
            if takes_value {
                tokens.push(Token::Flag(arg.clone(), Some(io_args[i + 1].clone())));
                i += 1;
            } else {
                tokens.push(Token::Flag(arg.clone(), None));
            }
        } else {
            tokens.push(Token::File(arg.clone()));
        }
        i += 1;
    }
    tokens
}

fn invalid(reason: impl Into<String>) -> FlowError {
    FlowError::InvalidCommand {
        reason: reason.into(),
    }
}

fn required<'a>(flag: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| invalid(format!("option {} needs a value", flag)))
}

fn apply_file_option(file: &mut FileArgs, flag: &str, value: &Option<String>) -> Result<()> {
    match flag {
        "-r" | "--rate" => {
            let v = required(flag, value)?;
            file.rate =
                Some(parse_frequency(v).ok_or_else(|| invalid(format!("invalid rate '{}'", v)))?);
        }
        "-c" | "--channels" => {
            let v = required(flag, value)?;
            file.channels = Some(
                parse_channel_count(v)
                    .ok_or_else(|| invalid(format!("invalid channel count '{}'", v)))?,
            );
        }
        "-b" | "--bits" => {
            let v = required(flag, value)?;
            file.precision = Some(
                v.parse::<u32>()
                    .ok()
                    .filter(|bits| (1..=64).contains(bits))
                    .ok_or_else(|| invalid(format!("invalid precision '{}'", v)))?,
            );
        }
        "-t" | "--type" => {
            file.file_type = Some(required(flag, value)?.to_string());
        }
        other if IGNORED_OPTIONS.contains(&other) => {}
        other => warn!("Ignoring unsupported option {}", other),
    }
    Ok(())
}

fn split_effects(fx_args: &[String], known: &[String]) -> Vec<EffectSpec> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    for arg in fx_args {
        match groups.last_mut() {
            Some(group) if !known.contains(arg) => group.push(arg.clone()),
            _ => groups.push(vec![arg.clone()]),
        }
    }
    groups
        .into_iter()
        .map(|mut group| {
            let name = group.remove(0);
            EffectSpec::new(name, group)
        })
        .collect()
}

impl SoxArgs {
    /// Parse an argument list; `known_effects` decides where effects start
    pub fn parse(args: &[String], known_effects: &[String]) -> Result<Self> {
        let args = match args.first() {
            Some(first) if first == "sox" => &args[1..],
            _ => args,
        };

        let fx_start = args
            .iter()
            .position(|a| known_effects.contains(a))
            .unwrap_or(args.len());
        let (io_args, fx_args) = args.split_at(fx_start);

        if io_args.iter().any(|a| a == "--combine") {
            return Err(invalid("--combine is not supported"));
        }

        let mut groups: Vec<Vec<(String, Option<String>)>> = Vec::new();
        let mut files = Vec::new();
        let mut pending = Vec::new();
        for token in tokenize(io_args) {
            match token {
                Token::Flag(flag, value) => pending.push((flag, value)),
                Token::File(path) => {
                    groups.push(std::mem::take(&mut pending));
                    files.push(path);
                }
            }
        }
        if !pending.is_empty() {
            warn!("Ignoring options after the last file: {:?}", pending);
        }

        match files.len() {
            0 | 1 => return Err(invalid("an input and an output file are required")),
            2 => {}
            n => return Err(invalid(format!("expected one input file, got {}", n - 1))),
        }

        let mut global_options = Vec::new();
        let mut input = FileArgs {
            path: files[0].clone(),
            ..FileArgs::default()
        };
        let mut output = FileArgs {
            path: files[1].clone(),
            ..FileArgs::default()
        };

        for (flag, value) in &groups[0] {
            if GLOBAL_OPTIONS.contains(&flag.as_str()) {
                global_options.push(flag.clone());
            } else {
                apply_file_option(&mut input, flag, value)?;
            }
        }
        for (flag, value) in &groups[1] {
            apply_file_option(&mut output, flag, value)?;
        }

        if input.is_pipe() {
            return Err(invalid("reading from '-' is not supported"));
        }

        let mut effects = split_effects(fx_args, known_effects);
        if let Some(channels) = output.channels {
            effects.push(EffectSpec::new(CHANNELS_EFFECT, [channels.to_string()]));
        }

        debug!(
            "Parsed sox args: {} -> {} with {} effects",
            input.path,
            output.path,
            effects.len()
        );
        Ok(Self {
            global_options,
            input,
            output,
            effects,
        })
    }

    /// Precision of the input buffer
    pub fn input_precision(&self) -> u32 {
        self.input.precision.unwrap_or(DEFAULT_PRECISION)
    }

    /// Derive the effect chain and output shape for an input signal.
    ///
    /// - `speed` is followed by a `rate` back to the current rate
    /// - `remix` sets the output channels to its argument count
    /// - an output `-r` appends a final `rate`
    /// - an empty chain becomes `no_effects`
    pub fn plan(&self, input: &SignalDescriptor) -> Result<FlowPlan> {
        let mut current_rate = input.rate;
        let mut rate_out = self.output.rate;
        let mut add_rate = self.output.rate.is_some();
        let mut out_channels: Option<u32> = None;

        let mut effects = Vec::new();
        for spec in &self.effects {
            effects.push(spec.clone());
            match spec.name.as_str() {
                "speed" => {
                    add_rate = true;
                    rate_out = Some(current_rate);
                }
                CHANNELS_EFFECT => {
                    if let Some(arg) = spec.args.first() {
                        out_channels = Some(parse_channel_count(arg).ok_or_else(|| {
                            FlowError::ArgumentParse {
                                effect: spec.name.clone(),
                                argument: arg.clone(),
                                expected: "a channel count",
                            }
                        })?);
                    }
                }
                RATE_EFFECT => {
                    if let Some(arg) = spec.args.last() {
                        current_rate =
                            parse_frequency(arg).ok_or_else(|| FlowError::ArgumentParse {
                                effect: spec.name.clone(),
                                argument: arg.clone(),
                                expected: "a sample rate",
                            })?;
                        rate_out = Some(current_rate);
                    }
                }
                "remix" => out_channels = Some(spec.args.len() as u32),
                _ => {}
            }
        }

        if add_rate {
            if let Some(rate) = rate_out {
                effects.push(EffectSpec::new(RATE_EFFECT, [rate.to_string()]));
            }
        }
        if effects.is_empty() {
            effects.push(EffectSpec::no_effects());
        }

        let target = SignalDescriptor::new(
            rate_out.unwrap_or(input.rate),
            out_channels.unwrap_or(input.channels),
            self.output.precision.unwrap_or_else(|| self.input_precision()),
        );
        Ok(FlowPlan { effects, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn known() -> Vec<String> {
        ["rate", "channels", "vol", "speed", "remix"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn parse(line: &str) -> Result<SoxArgs> {
        let args: Vec<String> = line.split_whitespace().map(String::from).collect();
        SoxArgs::parse(&args, &known())
    }

    #[test]
    fn test_basic_chain() {
        let sox = parse("sox in.wav out.wav rate 16000 vol 0.5").unwrap();
        assert_eq!(sox.input.path, "in.wav");
        assert_eq!(sox.output.path, "out.wav");
        assert_eq!(
            sox.effects,
            vec![
                EffectSpec::new("rate", ["16000"]),
                EffectSpec::new("vol", ["0.5"]),
            ]
        );
    }

    #[test]
    fn test_file_options() {
        let sox = parse("-V3 -c 2 -b 16 in.raw -r 8k -b 24 out.wav").unwrap();
        assert_eq!(sox.global_options, vec!["-V3"]);
        assert_eq!(sox.input.channels, Some(2));
        assert_eq!(sox.input.precision, Some(16));
        assert_eq!(sox.output.rate, Some(8000.0));
        assert_eq!(sox.output.precision, Some(24));
    }

    #[test]
    fn test_output_channels_appends_effect() {
        let sox = parse("in.wav -c 1 out.wav vol 2").unwrap();
        assert_eq!(sox.effects.last(), Some(&EffectSpec::new("channels", ["1"])));
    }

    #[test]
    fn test_rejects_combine_and_missing_files() {
        assert!(parse("--combine mix a.wav b.wav out.wav").is_err());
        assert!(parse("in.wav rate 16000").is_err());
        assert!(parse("a.wav b.wav out.wav").is_err());
        assert!(parse("- out.wav").is_err());
    }

    #[test]
    fn test_plan_empty_chain_is_sentinel() {
        let sox = parse("in.wav out.wav").unwrap();
        let plan = sox.plan(&SignalDescriptor::new(44100.0, 2, 16)).unwrap();
        assert_eq!(plan.effects, vec![EffectSpec::no_effects()]);
        assert_eq!(plan.target.rate, 44100.0);
        assert_eq!(plan.target.precision, 32);
    }

    #[test]
    fn test_plan_output_rate() {
        let sox = parse("in.wav -r 16000 out.wav").unwrap();
        let plan = sox.plan(&SignalDescriptor::new(44100.0, 1, 16)).unwrap();
        assert_eq!(plan.effects, vec![EffectSpec::new("rate", ["16000"])]);
        assert_eq!(plan.target.rate, 16000.0);
    }

    #[test]
    fn test_plan_speed_restores_rate() {
        let sox = parse("in.wav out.wav speed 1.5").unwrap();
        let plan = sox.plan(&SignalDescriptor::new(22050.0, 1, 16)).unwrap();
        assert_eq!(
            plan.effects,
            vec![
                EffectSpec::new("speed", ["1.5"]),
                EffectSpec::new("rate", ["22050"]),
            ]
        );
    }

    #[test]
    fn test_plan_remix_sets_channels() {
        let sox = parse("in.wav out.wav remix 1 2 1").unwrap();
        let plan = sox.plan(&SignalDescriptor::new(8000.0, 2, 16)).unwrap();
        assert_eq!(plan.target.channels, 3);
    }
}
