//! Effect chain builder
//!
//! Resolves the target signal/encoding from the effect list and validates
//! every effect against the engine before any stream or file is opened.

use log::{debug, warn};

use crate::effects::{
    parse_channel_count, parse_frequency, EffectSpec, CHANNELS_EFFECT, MAX_EFFECT_ARGS, RATE_EFFECT,
};
use crate::engine::{Effect, Engine};
use crate::error::{FlowError, Result};
use crate::format::{EncodingDescriptor, SignalDescriptor};

/// Effect looked up and configured, ready to connect
pub struct PreparedEffect {
    pub spec: EffectSpec,
    pub effect: Box<dyn Effect>,
}

impl std::fmt::Debug for PreparedEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedEffect")
            .field("spec", &self.spec)
            .finish()
    }
}

/// Output of `ChainBuilder::build`
#[derive(Debug)]
pub struct ResolvedChain {
    pub target_signal: SignalDescriptor,
    pub target_encoding: EncodingDescriptor,
    /// Effects before the first `no_effects`, in order
    pub stages: Vec<PreparedEffect>,
}

fn effective_args(spec: &EffectSpec) -> &[String] {
    match spec.args.as_slice() {
        [only] if only.is_empty() => &[],
        args => args,
    }
}

/// Resolve the target signal and encoding.
///
/// `rate` overrides the rate with its last argument, `channels` overrides
/// the channel count with its first. Effects without arguments do not
/// override.
pub fn resolve_target(
    input: &SignalDescriptor,
    target_signal: Option<&SignalDescriptor>,
    target_encoding: Option<&EncodingDescriptor>,
    effects: &[EffectSpec],
    past_sentinel: bool,
) -> Result<(SignalDescriptor, EncodingDescriptor)> {
    let mut target = match target_signal {
        Some(signal) => signal.clone(),
        None => SignalDescriptor::new(input.rate, input.channels, input.precision),
    };

    let mut after_sentinel = false;
    for spec in effects {
        if spec.is_sentinel() {
            if !past_sentinel {
                break;
            }
            after_sentinel = true;
            continue;
        }

        let args = effective_args(spec);
        let before = (target.rate, target.channels);
        if spec.name == RATE_EFFECT {
            if let Some(arg) = args.last() {
                target.rate = parse_frequency(arg).ok_or_else(|| FlowError::ArgumentParse {
                    effect: spec.name.clone(),
                    argument: arg.clone(),
                    expected: "a sample rate",
                })?;
            }
        } else if spec.name == CHANNELS_EFFECT {
            if let Some(arg) = args.first() {
                target.channels =
                    parse_channel_count(arg).ok_or_else(|| FlowError::ArgumentParse {
                        effect: spec.name.clone(),
                        argument: arg.clone(),
                        expected: "a channel count",
                    })?;
            }
        }

        if after_sentinel && before != (target.rate, target.channels) {
            warn!(
                "'{}' after no_effects changes the output to {} Hz x{} but will not run",
                spec, target.rate, target.channels
            );
        }
    }

    let encoding = match target_encoding {
        Some(encoding) => encoding.clone(),
        None => EncodingDescriptor::signed(target.precision),
    };
    Ok((target, encoding))
}

/// Builds validated effect lists against one engine
pub struct ChainBuilder<'e> {
    engine: &'e dyn Engine,
    resolve_past_sentinel: bool,
}

impl<'e> ChainBuilder<'e> {
    pub fn new(engine: &'e dyn Engine) -> Self {
        Self {
            engine,
            resolve_past_sentinel: true,
        }
    }

    pub fn resolve_past_sentinel(mut self, enabled: bool) -> Self {
        self.resolve_past_sentinel = enabled;
        self
    }

    /// Resolve the target and instantiate every effect up to the sentinel
    pub fn build(
        &self,
        input: &SignalDescriptor,
        target_signal: Option<&SignalDescriptor>,
        target_encoding: Option<&EncodingDescriptor>,
        effects: &[EffectSpec],
    ) -> Result<ResolvedChain> {
        let (target_signal, target_encoding) = resolve_target(
            input,
            target_signal,
            target_encoding,
            effects,
            self.resolve_past_sentinel,
        )?;
        target_signal.validate()?;

        let mut stages = Vec::new();
        for spec in effects.iter().take_while(|spec| !spec.is_sentinel()) {
            let args = effective_args(spec);
            if args.len() > MAX_EFFECT_ARGS {
                return Err(FlowError::EffectOption {
                    effect: spec.name.clone(),
                    reason: format!("{} arguments, at most {} allowed", args.len(), MAX_EFFECT_ARGS),
                });
            }
            let mut effect =
                self.engine
                    .create_effect(&spec.name)
                    .ok_or_else(|| FlowError::UnknownEffect {
                        name: spec.name.clone(),
                    })?;
            effect
                .configure(args)
                .map_err(|e| FlowError::EffectOption {
                    effect: spec.name.clone(),
                    reason: e.to_string(),
                })?;
            debug!("Prepared effect {}", spec);
            stages.push(PreparedEffect {
                spec: spec.clone(),
                effect,
            });
        }

        Ok(ResolvedChain {
            target_signal,
            target_encoding,
            stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NativeEngine;
    use crate::format::EncodingKind;

    fn mono_8k() -> SignalDescriptor {
        SignalDescriptor::new(8000.0, 1, 16).with_length(8000)
    }

    #[test]
    fn test_target_defaults_to_input() {
        let (signal, encoding) = resolve_target(&mono_8k(), None, None, &[], true).unwrap();
        assert_eq!(signal.rate, 8000.0);
        assert_eq!(signal.channels, 1);
        assert_eq!(signal.precision, 16);
        assert_eq!(signal.length, None);
        assert_eq!(encoding.kind, EncodingKind::Signed);
        assert_eq!(encoding.bits_per_sample, 16);
    }

    #[test]
    fn test_rate_and_channels_override() {
        let effects = vec![
            EffectSpec::new("rate", ["-q", "16000"]),
            EffectSpec::new("channels", ["2"]),
        ];
        let (signal, _) = resolve_target(&mono_8k(), None, None, &effects, true).unwrap();
        assert_eq!(signal.rate, 16000.0);
        assert_eq!(signal.channels, 2);
    }

    #[test]
    fn test_k_suffix() {
        let effects = vec![EffectSpec::new("rate", ["22.05k"])];
        let (signal, _) = resolve_target(&mono_8k(), None, None, &effects, true).unwrap();
        assert!((signal.rate - 22050.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_args_do_not_override() {
        let effects = vec![EffectSpec::new("rate", [""]), EffectSpec::named("channels")];
        let (signal, _) = resolve_target(&mono_8k(), None, None, &effects, true).unwrap();
        assert_eq!(signal.rate, 8000.0);
        assert_eq!(signal.channels, 1);
    }

    #[test]
    fn test_unparseable_argument() {
        let effects = vec![EffectSpec::new("rate", ["fast"])];
        let err = resolve_target(&mono_8k(), None, None, &effects, true).unwrap_err();
        match err {
            FlowError::ArgumentParse { effect, argument, .. } => {
                assert_eq!(effect, "rate");
                assert_eq!(argument, "fast");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_sentinel_resolution_modes() {
        let effects = vec![EffectSpec::no_effects(), EffectSpec::new("rate", ["16000"])];

        let (signal, _) = resolve_target(&mono_8k(), None, None, &effects, true).unwrap();
        assert_eq!(signal.rate, 16000.0);

        let (signal, _) = resolve_target(&mono_8k(), None, None, &effects, false).unwrap();
        assert_eq!(signal.rate, 8000.0);
    }

    #[test]
    fn test_build_stops_at_sentinel() {
        let engine = NativeEngine::default();
        let effects = vec![
            EffectSpec::new("vol", ["0.5"]),
            EffectSpec::no_effects(),
            EffectSpec::new("reverse", Vec::<String>::new()),
        ];
        let resolved = ChainBuilder::new(&engine)
            .build(&mono_8k(), None, None, &effects)
            .unwrap();
        assert_eq!(resolved.stages.len(), 1);
        assert_eq!(resolved.stages[0].spec.name, "vol");
    }

    #[test]
    fn test_build_rejects_unknown_and_bad_options() {
        let engine = NativeEngine::default();
        let builder = ChainBuilder::new(&engine);

        let err = builder
            .build(&mono_8k(), None, None, &[EffectSpec::named("flanger")])
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_EFFECT");

        let err = builder
            .build(&mono_8k(), None, None, &[EffectSpec::new("vol", ["loud"])])
            .unwrap_err();
        assert_eq!(err.error_code(), "EFFECT_OPTION");

        let many = EffectSpec::new("vol", vec!["1"; MAX_EFFECT_ARGS + 1]);
        let err = builder.build(&mono_8k(), None, None, &[many]).unwrap_err();
        assert_eq!(err.error_code(), "EFFECT_OPTION");
    }

    #[test]
    fn test_explicit_target_kept() {
        let target = SignalDescriptor::new(48000.0, 2, 24);
        let encoding = EncodingDescriptor::signed(24).with_kind(EncodingKind::Float);
        let (signal, enc) =
            resolve_target(&mono_8k(), Some(&target), Some(&encoding), &[], true).unwrap();
        assert_eq!(signal, target);
        assert_eq!(enc.kind, EncodingKind::Float);
    }
}
