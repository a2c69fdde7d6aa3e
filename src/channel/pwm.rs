//! Generic PWM channel
//!
//! Composes a Carrier and an EdgeAction policy with the dead-time compare
//! mapper. No runtime branching on carrier or policy type.

use tracing::{debug, trace, warn};

use crate::actions::{GateLevels, GatePair};
use crate::deadtime::{compute_thresholds, CompareCommand, DeadTime, Thresholds};
use crate::error::{check_frequency, PwmError, Result};
use crate::traits::{Carrier, Direction, EdgeAction};

use super::ParameterUpdate;

/// Everything a channel produces in one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmOutputs {
    /// Gate A output voltage
    pub gate_a: f64,
    /// Gate B output voltage
    pub gate_b: f64,
    /// Logical gate states
    pub gates: GatePair,
    /// Normalized carrier position in [0, 1]
    pub position: f64,
    /// Slope of the carrier at `position`
    pub direction: Direction,
    /// Fractional cycle count in [0, 1), zero at each period start
    pub counter: f64,
    /// Carrier wrapped or was re-synced during this step; feeds follower `sync_in`
    pub period_sync: bool,
    /// Frequency driving the carrier after this step (Hz)
    pub frequency: f64,
    /// Thresholds the gates were computed against
    pub thresholds: Thresholds,
}

impl PwmOutputs {
    /// Both gates off, carrier at rest
    fn idle(levels: &GateLevels, frequency: f64) -> Self {
        Self {
            gate_a: levels.off,
            gate_b: levels.off,
            gates: GatePair::OFF,
            position: 0.0,
            direction: Direction::default(),
            counter: 0.0,
            period_sync: false,
            frequency,
            thresholds: Thresholds::default(),
        }
    }
}

/// Generic PWM channel composed of trait implementations
///
/// # Type Parameters
/// * `K` - Carrier (time to normalized position)
/// * `A` - Edge-action policy (position and thresholds to gate states)
#[derive(Debug, Clone)]
pub struct PwmChannel<K, A>
where
    K: Carrier,
    A: EdgeAction,
{
    carrier: K,
    action: A,
    dead_time: DeadTime,
    command: CompareCommand,
    gate_levels: GateLevels,
    outputs: PwmOutputs,
}

impl<K, A> PwmChannel<K, A>
where
    K: Carrier,
    A: EdgeAction,
{
    /// Create a channel with no dead time, 0% duty and 1 V / 0 V gates
    ///
    /// # Arguments
    /// * `carrier` - Carrier generator
    /// * `action` - Gate action policy
    pub fn new(carrier: K, action: A) -> Self {
        let gate_levels = GateLevels::default();
        let outputs = PwmOutputs::idle(&gate_levels, carrier.frequency());
        Self {
            carrier,
            action,
            dead_time: DeadTime::None,
            command: CompareCommand::default(),
            gate_levels,
            outputs,
        }
    }

    /// Set the dead time, checked against the nominal carrier period
    pub fn with_dead_time(mut self, dead_time: DeadTime) -> Result<Self> {
        dead_time.validate(self.carrier.nominal_frequency())?;
        self.dead_time = dead_time;
        Ok(self)
    }

    /// Set the initial compare command
    pub fn with_command(mut self, command: CompareCommand) -> Self {
        self.command = command.clamped();
        self
    }

    /// Set the output voltages for on and off gates
    pub fn with_gate_levels(mut self, levels: GateLevels) -> Result<Self> {
        if !levels.on.is_finite() || !levels.off.is_finite() {
            return Err(PwmError::InvalidGateLevels {
                on: levels.on,
                off: levels.off,
            });
        }
        self.gate_levels = levels;
        self.outputs = PwmOutputs::idle(&levels, self.carrier.frequency());
        Ok(self)
    }

    /// Advance to `time` (seconds) with the stored compare command
    ///
    /// `sync_in` re-zeroes the carrier when external sync is enabled.
    pub fn step(&mut self, time: f64, sync_in: bool) -> PwmOutputs {
        let sample = self.carrier.advance(time, sync_in);

        // Normalize against the rate of the cycle now running, which may
        // have changed at a wrap during this step
        let frequency = self.carrier.frequency();
        let thresholds = compute_thresholds(self.command, &self.dead_time, frequency);
        let gates = self.action.apply(&sample, &thresholds);

        if sample.period_boundary {
            trace!(time, frequency, "carrier period boundary");
        }

        self.outputs = PwmOutputs {
            gate_a: self.gate_levels.level(gates.a),
            gate_b: self.gate_levels.level(gates.b),
            gates,
            position: sample.position,
            direction: sample.direction,
            counter: sample.counter,
            period_sync: sample.period_boundary,
            frequency,
            thresholds,
        };
        self.outputs
    }

    /// Store `command` and advance to `time`
    ///
    /// The command stays in effect for later [`step`](Self::step) calls.
    pub fn step_with(&mut self, time: f64, command: CompareCommand, sync_in: bool) -> PwmOutputs {
        self.command = command.clamped();
        self.step(time, sync_in)
    }

    /// Apply a batch of parameter changes
    ///
    /// Each field is validated on its own. A rejected field keeps its
    /// previous value, the remaining fields still apply, and the first
    /// error is returned.
    pub fn update_parameters(&mut self, update: ParameterUpdate) -> Result<()> {
        let mut first_error = None;
        let mut reject = |err: PwmError| {
            warn!(%err, "parameter update rejected");
            first_error.get_or_insert(err);
        };

        let frequency = match update.frequency.map(check_frequency).transpose() {
            Ok(frequency) => frequency,
            Err(err) => {
                reject(err);
                None
            }
        };

        // Dead time must fit the period that is about to apply
        if let Some(dead_time) = update.dead_time {
            let against = frequency.unwrap_or_else(|| self.carrier.nominal_frequency());
            match dead_time.validate(against) {
                Ok(()) => {
                    self.dead_time = dead_time;
                    debug!(?dead_time, "dead time updated");
                }
                Err(err) => reject(err),
            }
        }

        if let Some(frequency) = frequency {
            let applied = self
                .dead_time
                .validate(frequency)
                .and_then(|()| self.carrier.request_frequency(frequency));
            if let Err(err) = applied {
                reject(err);
            }
        }

        if let Some(phase_offset) = update.phase_offset {
            self.carrier.request_phase(phase_offset);
            debug!(phase_offset, "phase offset requested");
        }

        if let Some(command) = update.command {
            self.command = command.clamped();
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Clear dynamic state and drive both gates off
    ///
    /// Frequency, phase offset, dead time and command are kept.
    pub fn reset(&mut self) {
        self.carrier.reset();
        self.action.reset();
        self.outputs = PwmOutputs::idle(&self.gate_levels, self.carrier.frequency());
    }

    /// Outputs of the most recent step
    pub fn outputs(&self) -> &PwmOutputs {
        &self.outputs
    }

    pub fn carrier(&self) -> &K {
        &self.carrier
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn dead_time(&self) -> DeadTime {
        self.dead_time
    }

    pub fn command(&self) -> CompareCommand {
        self.command
    }

    pub fn gate_levels(&self) -> GateLevels {
        self.gate_levels
    }

    /// Frequency driving the carrier right now (Hz)
    pub fn frequency(&self) -> f64 {
        self.carrier.frequency()
    }

    /// Configured switching frequency (Hz)
    pub fn nominal_frequency(&self) -> f64 {
        self.carrier.nominal_frequency()
    }

    /// Carrier period at the nominal frequency (seconds)
    pub fn period(&self) -> f64 {
        1.0 / self.carrier.nominal_frequency()
    }
}
