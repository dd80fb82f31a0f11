//! Sample width conversion
//!
//! Engine samples are full-scale 32-bit. Containers store narrower values,
//! so reads left-align and writes round with clipping.

use num_traits::{clamp, Bounded, NumCast};

use crate::format::Sample;

const FULL_SCALE: f64 = 2_147_483_648.0;

/// Left-align a `bits`-wide signed value into a full-scale sample
#[inline]
pub fn widen(value: i64, bits: u32) -> Sample {
    let shifted = if bits >= 32 {
        value >> (bits - 32)
    } else {
        value << (32 - bits)
    };
    clamp(shifted, i32::MIN as i64, i32::MAX as i64) as Sample
}

/// Round a full-scale sample to a `bits`-wide signed value, clipping
#[inline]
pub fn narrow(sample: Sample, bits: u32) -> i64 {
    if bits >= 32 {
        return (sample as i64) << (bits - 32);
    }
    let shift = 32 - bits;
    let rounded = ((sample as i64) + (1 << (shift - 1))) >> shift;
    let max = (1i64 << (bits - 1)) - 1;
    clamp(rounded, -max - 1, max)
}

/// Narrow into a concrete integer type
#[inline]
pub fn narrow_to<T: NumCast + Bounded>(sample: Sample, bits: u32) -> T {
    NumCast::from(narrow(sample, bits)).unwrap_or_else(|| {
        if sample < 0 {
            T::min_value()
        } else {
            T::max_value()
        }
    })
}

/// Convert a float in [-1, 1] into a full-scale sample
#[inline]
pub fn from_float(value: f64) -> Sample {
    let scaled = (value * FULL_SCALE).round();
    clamp(scaled, i32::MIN as f64, i32::MAX as f64) as Sample
}

/// Convert a full-scale sample into a float in [-1, 1)
#[inline]
pub fn to_float(sample: Sample) -> f64 {
    sample as f64 / FULL_SCALE
}
