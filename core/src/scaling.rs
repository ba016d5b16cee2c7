//! Numeric helpers shared by every difficulty-scaled formula.
//!
//! Each helper absorbs degenerate input (NaN, infinities, zero denominators)
//! instead of signalling failure, so formulas built on top of them stay total.

use std::time::Duration;

/// Logarithm base used by a scaling axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogBase {
    /// Binary logarithm; grows quickly, used for hit points and costs.
    Two,
    /// Decimal logarithm; grows gently, used for cadence, caps and speed.
    Ten,
}

impl LogBase {
    fn log(self, value: f64) -> f64 {
        match self {
            Self::Two => value.log2(),
            Self::Ten => value.log10(),
        }
    }
}

/// Clamps `value` into `[min, max]`, mapping NaN to `min`.
#[must_use]
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Ratio `numerator / denominator` clamped to `[0, 1]`; zero when the denominator is not positive.
#[must_use]
pub fn unit_ratio(numerator: f64, denominator: f64) -> f64 {
    if !(denominator > 0.0) {
        return 0.0;
    }
    clamp_finite(numerator / denominator, 0.0, 1.0)
}

/// Linear ramp from `threshold` to `threshold + span`, clamped to `[0, 1]`.
///
/// A non-positive span turns the ramp into a step at `threshold`.
#[must_use]
pub fn ramp(value: f64, threshold: f64, span: f64) -> f64 {
    if !(span > 0.0) {
        return if value >= threshold { 1.0 } else { 0.0 };
    }
    clamp_finite((value - threshold) / span, 0.0, 1.0)
}

/// Growth factor `1 + coefficient * log(difficulty)` applied above baseline difficulty.
#[must_use]
pub fn log_growth(difficulty: f64, coefficient: f64, base: LogBase) -> f64 {
    if !(difficulty > 1.0) {
        return 1.0;
    }
    let growth = 1.0 + coefficient * base.log(difficulty);
    if growth.is_finite() {
        growth
    } else {
        1.0
    }
}

/// Scale factor for a single axis: logarithmic growth above 1.0, linear relief below it.
///
/// Below baseline the factor is `max(relief_floor, difficulty)`, so easier runs
/// never drop under the floor.
#[must_use]
pub fn difficulty_scale(difficulty: f64, coefficient: f64, base: LogBase, relief_floor: f64) -> f64 {
    if difficulty > 1.0 {
        log_growth(difficulty, coefficient, base)
    } else if difficulty.is_nan() {
        1.0
    } else {
        difficulty.max(relief_floor)
    }
}

/// Rounds half away from zero into a `u64`, saturating and mapping NaN or negatives to zero.
#[must_use]
pub fn round_u64(value: f64) -> u64 {
    if !(value > 0.0) {
        return 0;
    }
    value.round() as u64
}

/// Truncates toward zero into a `u64`, saturating and mapping NaN or negatives to zero.
#[must_use]
pub fn floor_u64(value: f64) -> u64 {
    if !(value > 0.0) {
        return 0;
    }
    value.floor() as u64
}

/// Truncates toward zero into a `u32`, saturating and mapping NaN or negatives to zero.
#[must_use]
pub fn floor_u32(value: f64) -> u32 {
    if !(value > 0.0) {
        return 0;
    }
    value.floor() as u32
}

/// Rounds up into a `u32`, saturating and mapping NaN or negatives to zero.
#[must_use]
pub fn ceil_u32(value: f64) -> u32 {
    if !(value > 0.0) {
        return 0;
    }
    value.ceil() as u32
}

/// Divides a duration by `divisor`, returning the original duration when the divisor is unusable.
#[must_use]
pub fn divide_duration(duration: Duration, divisor: f64) -> Duration {
    if !(divisor > 0.0) || !divisor.is_finite() {
        return duration;
    }
    let nanos = duration.as_nanos() as f64 / divisor;
    if !nanos.is_finite() {
        return duration;
    }
    Duration::from_nanos(round_u64(nanos))
}
