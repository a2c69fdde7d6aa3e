//! PWM channels
//!
//! Generic `PwmChannel` composes a carrier and an action policy for
//! compile-time specialization. `PwmModule` is the runtime-configured
//! form built from a [`PwmConfig`].

mod pwm;
mod update;


pub use pwm::{PwmChannel, PwmOutputs};
pub use update::ParameterUpdate;

use tracing::debug;

use crate::actions::{ActionPolicy, PolicyKind};
use crate::carriers::{CarrierKind, PhaseMode};
use crate::config::PwmConfig;
use crate::error::Result;

/// Channel with carrier and policy chosen at runtime
pub type PwmModule = PwmChannel<CarrierKind, ActionPolicy>;

impl PwmModule {
    /// Validate `config` and build a channel in its reset state
    pub fn init(config: PwmConfig) -> Result<Self> {
        config.validate()?;

        let carrier = CarrierKind::build(
            config.phase_mode,
            config.shape,
            config.frequency,
            config.phase_offset,
            config.sync_enable,
        )?;
        let action = ActionPolicy::build(config.policy);

        let mut module = PwmChannel::new(carrier, action)
            .with_dead_time(config.dead_time)?
            .with_gate_levels(config.gate_levels)?
            .with_command(config.command);
        module.reset();

        debug!(
            frequency = config.frequency,
            period = config.period(),
            dead_time = config.dead_time.max(),
            "pwm module initialized"
        );
        Ok(module)
    }

    /// How this module applies phase and frequency changes
    pub fn phase_mode(&self) -> PhaseMode {
        self.carrier().phase_mode()
    }

    /// Configured action policy
    pub fn policy(&self) -> PolicyKind {
        self.action().kind()
    }
}
