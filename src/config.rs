//! Module configuration
//!
//! Everything needed to build a [`PwmModule`](crate::PwmModule). Optional
//! fields have serde defaults so a host can send only what it cares about:
//!
//! ```json
//! { "frequency": 100000.0, "dead_time": { "symmetric": 1e-7 }, "policy": "threshold" }
//! ```

use serde::{Deserialize, Serialize};

use crate::actions::{GateLevels, PolicyKind};
use crate::carriers::{CarrierShape, PhaseMode};
use crate::deadtime::{CompareCommand, DeadTime};
use crate::error::{check_frequency, PwmError, Result};

/// Static configuration of one PWM channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PwmConfig {
    /// Nominal switching frequency (Hz)
    pub frequency: f64,
    #[serde(default)]
    pub shape: CarrierShape,
    #[serde(default)]
    pub phase_mode: PhaseMode,
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default)]
    pub gate_levels: GateLevels,
    /// Accept external sync pulses
    #[serde(default)]
    pub sync_enable: bool,
    /// Phase offset relative to an unshifted carrier (seconds)
    #[serde(default)]
    pub phase_offset: f64,
    #[serde(default)]
    pub dead_time: DeadTime,
    /// Command used until the first update
    #[serde(default)]
    pub command: CompareCommand,
}

impl PwmConfig {
    /// Triangle carrier, threshold policy, no dead time, 0% duty
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            shape: CarrierShape::default(),
            phase_mode: PhaseMode::default(),
            policy: PolicyKind::default(),
            gate_levels: GateLevels::default(),
            sync_enable: false,
            phase_offset: 0.0,
            dead_time: DeadTime::default(),
            command: CompareCommand::default(),
        }
    }

    pub fn with_shape(mut self, shape: CarrierShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_phase_mode(mut self, phase_mode: PhaseMode) -> Self {
        self.phase_mode = phase_mode;
        self
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_gate_levels(mut self, on: f64, off: f64) -> Self {
        self.gate_levels = GateLevels { on, off };
        self
    }

    pub fn with_sync(mut self, enable: bool) -> Self {
        self.sync_enable = enable;
        self
    }

    pub fn with_phase_offset(mut self, seconds: f64) -> Self {
        self.phase_offset = seconds;
        self
    }

    pub fn with_dead_time(mut self, dead_time: DeadTime) -> Self {
        self.dead_time = dead_time;
        self
    }

    pub fn with_duty(mut self, duty: f64) -> Self {
        self.command = CompareCommand::Single(duty);
        self
    }

    pub fn with_command(mut self, command: CompareCommand) -> Self {
        self.command = command;
        self
    }

    /// Carrier period at the nominal frequency (seconds)
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Reject configurations the channel cannot run with
    pub fn validate(&self) -> Result<()> {
        check_frequency(self.frequency)?;
        self.dead_time.validate(self.frequency)?;

        let GateLevels { on, off } = self.gate_levels;
        if !on.is_finite() || !off.is_finite() {
            return Err(PwmError::InvalidGateLevels { on, off });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionMode;

    #[test]
    fn test_defaults() {
        let config = PwmConfig::new(20e3);
        assert!(config.validate().is_ok());
        assert_eq!(config.shape, CarrierShape::Triangular);
        assert_eq!(config.phase_mode, PhaseMode::Continuous);
        assert_eq!(config.policy, PolicyKind::Threshold);
        assert_eq!(config.command, CompareCommand::Single(0.0));
        assert!((config.period() - 50e-6).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects() {
        assert_eq!(
            PwmConfig::new(0.0).validate(),
            Err(PwmError::InvalidFrequency(0.0))
        );
        assert!(PwmConfig::new(100e3)
            .with_dead_time(DeadTime::Symmetric(-1e-9))
            .validate()
            .is_err());
        assert!(matches!(
            PwmConfig::new(100e3)
                .with_dead_time(DeadTime::Symmetric(10e-6))
                .validate(),
            Err(PwmError::DeadTimeExceedsPeriod { .. })
        ));
        assert!(PwmConfig::new(100e3)
            .with_gate_levels(f64::NAN, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: PwmConfig = serde_json::from_str(r#"{ "frequency": 50000.0 }"#).unwrap();
        assert_eq!(config, PwmConfig::new(50e3));
    }

    #[test]
    fn test_deserialize_full() {
        let json = r#"{
            "frequency": 100000.0,
            "shape": "sawtooth_up",
            "phase_mode": "immediate",
            "policy": { "crossing": "set_down_a_clear_up_b" },
            "gate_levels": { "on": 15.0, "off": -5.0 },
            "sync_enable": true,
            "phase_offset": 2.5e-6,
            "dead_time": { "asymmetric": { "rising": 1e-7, "falling": 2e-7 } },
            "command": { "dual": { "a": 0.3, "b": 0.6 } }
        }"#;
        let config: PwmConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.shape, CarrierShape::SawtoothUp);
        assert_eq!(config.phase_mode, PhaseMode::Immediate);
        assert_eq!(config.policy, PolicyKind::Crossing(ActionMode::SetDownAClearUpB));
        assert_eq!(config.gate_levels, GateLevels { on: 15.0, off: -5.0 });
        assert!(config.sync_enable);
        assert_eq!(
            config.dead_time,
            DeadTime::Asymmetric {
                rising: 1e-7,
                falling: 2e-7
            }
        );
        assert_eq!(config.command, CompareCommand::Dual { a: 0.3, b: 0.6 });
        assert!(config.validate().is_ok());
    }
}
