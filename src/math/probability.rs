//! Probability shaping for the update field
//!
//! Raw noise in `[0, 1]` is steepened by a sigmoid around its midpoint and then
//! mapped onto the configured probability range, so most cells sit near one of
//! the two extremes instead of spreading evenly between them.

use crate::io::configuration::SIGMOID_STEEPNESS;
use num_traits::Float;

/// Sigmoid steepening of a raw noise sample around 0.5
pub fn sigmoid_reshape(raw: f64) -> f64 {
    1.0 / (1.0 + (-SIGMOID_STEEPNESS * (raw - 0.5)).exp())
}

/// Per-cell update probability for a raw noise sample
///
/// Lies within `[min, max]` for every raw value as long as `min <= max`.
pub fn update_probability(raw: f64, min: f64, max: f64) -> f64 {
    sigmoid_reshape(raw).mul_add(max - min, min)
}

/// Unclamped linear remap of `value` from one range onto another
///
/// A degenerate input range maps everything onto `out_lo`.
pub fn map_range<T: Float>(value: T, in_lo: T, in_hi: T, out_lo: T, out_hi: T) -> T {
    let span = in_hi - in_lo;
    if span == T::zero() {
        return out_lo;
    }
    out_lo + (value - in_lo) / span * (out_hi - out_lo)
}

/// Position of a probability within the configured range, nominally `[0, 1]`
pub fn normalized_probability(probability: f64, min: f64, max: f64) -> f64 {
    map_range(probability, min, max, 0.0, 1.0)
}

/// Clamp a probability into `[0, 1]`
pub fn clamp_unit(value: f64) -> f64 {
    num_traits::clamp(value, 0.0, 1.0)
}
