//! Runtime parameter updates

use serde::{Deserialize, Serialize};

use crate::deadtime::{CompareCommand, DeadTime};

/// A batch of parameter changes; `None` leaves a field untouched
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterUpdate {
    /// New nominal frequency (Hz), applied at the next period boundary
    pub frequency: Option<f64>,
    /// New dead time, applied on the next step
    pub dead_time: Option<DeadTime>,
    /// New phase offset (seconds), applied by a warp cycle
    pub phase_offset: Option<f64>,
    /// New compare command, applied on the next step
    pub command: Option<CompareCommand>,
}

impl ParameterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the host convention where out-of-range values mean "keep"
    ///
    /// Non-positive frequency, negative dead time, NaN phase and negative
    /// duty are all "no change". Duty above 1 is clamped.
    pub fn from_sentinels(frequency: f64, dead_time: f64, phase_offset: f64, duty: f64) -> Self {
        Self {
            frequency: (frequency > 0.0).then_some(frequency),
            dead_time: (dead_time >= 0.0).then_some(DeadTime::Symmetric(dead_time)),
            phase_offset: (!phase_offset.is_nan()).then_some(phase_offset),
            command: (duty >= 0.0).then(|| CompareCommand::Single(duty).clamped()),
        }
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_dead_time(mut self, dead_time: DeadTime) -> Self {
        self.dead_time = Some(dead_time);
        self
    }

    pub fn with_phase_offset(mut self, seconds: f64) -> Self {
        self.phase_offset = Some(seconds);
        self
    }

    pub fn with_duty(mut self, duty: f64) -> Self {
        self.command = Some(CompareCommand::Single(duty));
        self
    }

    pub fn with_command(mut self, command: CompareCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// True if applying this update would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_mean_no_change() {
        let update = ParameterUpdate::from_sentinels(0.0, -1.0, f64::NAN, -1.0);
        assert!(update.is_empty());

        let update = ParameterUpdate::from_sentinels(-50e3, f64::NAN, f64::NAN, f64::NAN);
        assert!(update.is_empty(), "update {:?}", update);
    }

    #[test]
    fn test_sentinels_pass_values() {
        let update = ParameterUpdate::from_sentinels(50e3, 0.0, -2e-6, 0.25);
        assert_eq!(update.frequency, Some(50e3));
        assert_eq!(update.dead_time, Some(DeadTime::Symmetric(0.0)));
        assert_eq!(update.phase_offset, Some(-2e-6));
        assert_eq!(update.command, Some(CompareCommand::Single(0.25)));
    }

    #[test]
    fn test_sentinel_duty_clamped() {
        let update = ParameterUpdate::from_sentinels(0.0, -1.0, f64::NAN, 1.7);
        assert_eq!(update.command, Some(CompareCommand::Single(1.0)));
    }

    #[test]
    fn test_builders() {
        let update = ParameterUpdate::new()
            .with_frequency(20e3)
            .with_duty(0.4)
            .with_phase_offset(1e-6);
        assert_eq!(update.frequency, Some(20e3));
        assert_eq!(update.command, Some(CompareCommand::Single(0.4)));
        assert_eq!(update.dead_time, None);
        assert!(!update.is_empty());
    }
}
