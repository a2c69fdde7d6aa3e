//! Dead-time compare mapper
//!
//! Turns a commanded compare value into the pair of thresholds actually
//! used for switching. Dead time is configured in seconds and normalized
//! against the *active* carrier frequency on every step, so it stays
//! correct across frequency changes and warp cycles.
//!
//! ```text
//! lead = clamp(cmd + rising  * f / 2, 0, 1)
//! lag  = clamp(cmd - falling * f / 2, 0, 1)
//! ```
//!
//! Near 0% and 100% duty the pair collapses to a fixed level instead of
//! producing slivers of pulses.

use serde::{Deserialize, Serialize};

use crate::error::{PwmError, Result};
use crate::utils::clamp_unit;

/// Dead time between complementary edges (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadTime {
    /// No dead time
    #[default]
    None,
    /// Same delay on both edges
    Symmetric(f64),
    /// Independent rising-edge and falling-edge delays
    Asymmetric { rising: f64, falling: f64 },
}

impl DeadTime {
    /// Rising-edge delay (seconds)
    pub fn rising(&self) -> f64 {
        match *self {
            Self::None => 0.0,
            Self::Symmetric(s) => s,
            Self::Asymmetric { rising, .. } => rising,
        }
    }

    /// Falling-edge delay (seconds)
    pub fn falling(&self) -> f64 {
        match *self {
            Self::None => 0.0,
            Self::Symmetric(s) => s,
            Self::Asymmetric { falling, .. } => falling,
        }
    }

    /// Largest of the two delays (seconds)
    pub fn max(&self) -> f64 {
        self.rising().max(self.falling())
    }

    /// Check the delays are usable at `freq_hz`
    ///
    /// Each delay must be non-negative and strictly shorter than one
    /// carrier period.
    pub fn validate(&self, freq_hz: f64) -> Result<()> {
        for delay in [self.rising(), self.falling()] {
            if !delay.is_finite() || delay < 0.0 {
                return Err(PwmError::InvalidDeadTime(delay));
            }
        }

        let period = 1.0 / freq_hz;
        if self.max() >= period {
            return Err(PwmError::DeadTimeExceedsPeriod {
                dead_time: self.max(),
                period,
            });
        }
        Ok(())
    }

    /// Half of each normalized delay at `freq_hz`: (rising, falling)
    #[inline]
    pub fn half_normalized(&self, freq_hz: f64) -> (f64, f64) {
        (
            0.5 * self.rising() * freq_hz,
            0.5 * self.falling() * freq_hz,
        )
    }
}

/// Commanded compare value(s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareCommand {
    /// One duty value for center-aligned single compare
    Single(f64),
    /// Independent compare A and B values
    Dual { a: f64, b: f64 },
}

impl Default for CompareCommand {
    fn default() -> Self {
        Self::Single(0.0)
    }
}

impl CompareCommand {
    /// Same command with every value clamped to [0, 1]
    pub fn clamped(self) -> Self {
        match self {
            Self::Single(duty) => Self::Single(clamp_unit(duty)),
            Self::Dual { a, b } => Self::Dual {
                a: clamp_unit(a),
                b: clamp_unit(b),
            },
        }
    }

    /// Compare A and compare B values (equal in single mode)
    pub fn values(&self) -> (f64, f64) {
        match *self {
            Self::Single(duty) => (duty, duty),
            Self::Dual { a, b } => (a, b),
        }
    }
}

/// Dead-time adjusted thresholds for one compare value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgePair {
    /// Compare plus half the rising delay
    pub lead: f64,
    /// Compare minus half the falling delay
    pub lag: f64,
}

impl EdgePair {
    /// Both thresholds forced low (always-off)
    pub const OFF: Self = Self { lead: 0.0, lag: 0.0 };
    /// Both thresholds forced high (always-on)
    pub const ON: Self = Self { lead: 1.0, lag: 1.0 };

    /// Apply dead time to one compare value
    ///
    /// # Arguments
    /// * `compare` - Commanded compare value, clamped to [0, 1]
    /// * `half_rising` - Half the rising delay, normalized to the period
    /// * `half_falling` - Half the falling delay, normalized to the period
    pub fn from_compare(compare: f64, half_rising: f64, half_falling: f64) -> Self {
        let compare = clamp_unit(compare);
        let lead = clamp_unit(compare + half_rising);
        let lag = clamp_unit(compare - half_falling);

        if lead <= 0.0 || lag <= 0.0 {
            Self::OFF
        } else if lead >= 1.0 || lag >= 1.0 {
            Self::ON
        } else {
            Self { lead, lag }
        }
    }

    /// Forced level if this pair collapsed, `None` while switching
    #[inline]
    pub fn collapsed(&self) -> Option<bool> {
        if *self == Self::OFF {
            Some(false)
        } else if *self == Self::ON {
            Some(true)
        } else {
            None
        }
    }
}

/// Thresholds for both compare channels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    pub a: EdgePair,
    pub b: EdgePair,
}

impl Thresholds {
    /// Level shared by both channels when both collapsed the same way
    #[inline]
    pub fn forced_level(&self) -> Option<bool> {
        match (self.a.collapsed(), self.b.collapsed()) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }
}

/// Compute switching thresholds for a command at the active frequency
///
/// # Arguments
/// * `command` - Single duty or dual compare values
/// * `dead_time` - Dead time in seconds
/// * `freq_hz` - Frequency currently driving the carrier
pub fn compute_thresholds(command: CompareCommand, dead_time: &DeadTime, freq_hz: f64) -> Thresholds {
    let (half_rising, half_falling) = dead_time.half_normalized(freq_hz);
    match command {
        CompareCommand::Single(duty) => {
            let pair = EdgePair::from_compare(duty, half_rising, half_falling);
            Thresholds { a: pair, b: pair }
        }
        CompareCommand::Dual { a, b } => Thresholds {
            a: EdgePair::from_compare(a, half_rising, half_falling),
            b: EdgePair::from_compare(b, half_rising, half_falling),
        },
    }
}
