//! Rounding helpers for displayed metrics.

/// Rounds to one decimal place, halves away from zero.
///
/// `2.25 -> 2.3`, `-2.25 -> -2.3`. Non-finite input yields `0.0`.
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

/// Average of `total` over `count` items rounded to one decimal, 0 when empty.
pub fn average_to_tenth(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round_to_tenth(total / count as f64)
}
