//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Percentage of `part` over `total`, rounded half away from zero.
///
/// An empty total yields 0 rather than dividing by zero.
#[must_use]
pub fn percent_of(part: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    round_f64_to_i32(usize_to_f64(part) * 100.0 / usize_to_f64(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(2.5), 3);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn percent_handles_empty_and_partial_totals() {
        assert_eq!(percent_of(0, 0), 0);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(4, 4), 100);
    }
}
