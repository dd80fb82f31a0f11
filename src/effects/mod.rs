//! Effect specifications
//!
//! An effect is requested by name with an ordered list of string
//! arguments. Arguments are validated by the engine when the effect is
//! configured, except for the two shape-changing effects whose arguments
//! also drive output format resolution.

mod spec;

pub use spec::{EffectSpec, CHANNELS_EFFECT, NO_EFFECTS, RATE_EFFECT};

/// Most arguments a single effect accepts
pub const MAX_EFFECT_ARGS: usize = 20;

/// Parse a frequency argument in Hz, accepting a `k` suffix (`"16k"` is 16000).
pub fn parse_frequency(arg: &str) -> Option<f64> {
    let trimmed = arg.trim();
    let (digits, scale) = match trimmed
        .strip_suffix('k')
        .or_else(|| trimmed.strip_suffix('K'))
    {
        Some(rest) => (rest, 1000.0),
        None => (trimmed, 1.0),
    };
    let value: f64 = digits.parse().ok()?;
    let hz = value * scale;
    if hz.is_finite() && hz > 0.0 {
        Some(hz)
    } else {
        None
    }
}

/// Parse a channel count argument (an integer of at least 1)
pub fn parse_channel_count(arg: &str) -> Option<u32> {
    match arg.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Parse a gain argument in dB (`"-6"`, `"-6dB"`)
pub fn parse_db(arg: &str) -> Option<f64> {
    let trimmed = arg.trim();
    let digits = trimmed
        .strip_suffix("dB")
        .or_else(|| trimmed.strip_suffix("db"))
        .unwrap_or(trimmed);
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a time position in seconds, accepting `[[hh:]mm:]ss[.frac]`
pub fn parse_seconds(arg: &str) -> Option<f64> {
    let mut total = 0.0;
    for part in arg.trim().split(':') {
        let value: f64 = part.parse().ok()?;
        if value < 0.0 {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(total)
}
