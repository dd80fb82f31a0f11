//! Named effect with its argument list

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel name that stops stage instantiation
pub const NO_EFFECTS: &str = "no_effects";

/// Rate-change effect; its last argument is the output rate
pub const RATE_EFFECT: &str = "rate";

/// Channel-change effect; its first argument is the output channel count
pub const CHANNELS_EFFECT: &str = "channels";

/// A named effect plus its ordered string arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl EffectSpec {
    /// Create an effect spec.
    ///
    /// A lone empty argument means "no arguments".
    pub fn new<N, I, S>(name: N, args: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.len() == 1 && args[0].is_empty() {
            args.clear();
        }
        Self {
            name: name.into(),
            args,
        }
    }

    /// Effect with no arguments
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// The `no_effects` sentinel
    pub fn no_effects() -> Self {
        Self::named(NO_EFFECTS)
    }

    pub fn is_sentinel(&self) -> bool {
        self.name == NO_EFFECTS
    }
}

impl fmt::Display for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
