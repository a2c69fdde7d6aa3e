//! Error type for configuration and runtime updates
//!
//! Only configuration can fail. Stepping never returns an error: malformed
//! commands and out-of-order timestamps are clamped instead.

use std::fmt;

/// Rejected configuration or parameter change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PwmError {
    /// Carrier frequency must be finite and positive (Hz)
    InvalidFrequency(f64),
    /// Dead time must be finite and non-negative (seconds)
    InvalidDeadTime(f64),
    /// Dead time is not shorter than the carrier period
    DeadTimeExceedsPeriod { dead_time: f64, period: f64 },
    /// Gate voltage levels must be finite
    InvalidGateLevels { on: f64, off: f64 },
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFrequency(hz) => {
                write!(f, "carrier frequency must be positive, got {} Hz", hz)
            }
            Self::InvalidDeadTime(s) => {
                write!(f, "dead time must be non-negative, got {} s", s)
            }
            Self::DeadTimeExceedsPeriod { dead_time, period } => write!(
                f,
                "dead time {} s is not shorter than carrier period {} s",
                dead_time, period
            ),
            Self::InvalidGateLevels { on, off } => {
                write!(f, "gate levels must be finite, got on={} off={}", on, off)
            }
        }
    }
}

impl std::error::Error for PwmError {}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PwmError>;

/// Check that a carrier frequency is usable
pub(crate) fn check_frequency(frequency: f64) -> Result<f64> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(frequency)
    } else {
        Err(PwmError::InvalidFrequency(frequency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_frequency() {
        assert_eq!(check_frequency(50e3), Ok(50e3));
        assert!(check_frequency(0.0).is_err());
        assert!(check_frequency(-1.0).is_err());
        assert!(check_frequency(f64::NAN).is_err());
        assert!(check_frequency(f64::INFINITY).is_err());
    }

    #[test]
    fn test_display_mentions_values() {
        let err = PwmError::DeadTimeExceedsPeriod {
            dead_time: 2e-5,
            period: 1e-5,
        };
        let msg = err.to_string();
        assert!(msg.contains("0.00002"), "message: {}", msg);
        assert!(msg.contains("0.00001"), "message: {}", msg);
    }
}
