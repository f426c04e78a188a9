//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Truncate a non-negative stat score to a table index, clamped to `max`.
///
/// Negative or NaN scores map to 0.
#[must_use]
pub fn score_to_index(score: f64, max: usize) -> usize {
    if !score.is_finite() {
        return if score == f64::INFINITY { max } else { 0 };
    }
    cast::<f64, usize>(score.max(0.0).floor())
        .unwrap_or(max)
        .min(max)
}

/// Sign of a value as -1, 0 or 1; NaN counts as 0.
#[must_use]
pub fn sign(value: f64) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
