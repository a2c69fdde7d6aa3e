//! Clamping utilities for normalized compare values

/// Clamp a value to the unit interval [0, 1]
///
/// NaN maps to 0.0 so a malformed command can never enable a gate.
#[inline]
pub fn clamp_unit(val: f64) -> f64 {
    if val >= 1.0 {
        1.0
    } else if val > 0.0 {
        val
    } else {
        // Also catches NaN
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_in_range() {
        assert_eq!(clamp_unit(0.0), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(1.0), 1.0);
    }

    #[test]
    fn test_clamp_overflow() {
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(f64::INFINITY), 1.0);
        assert_eq!(clamp_unit(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }
}
