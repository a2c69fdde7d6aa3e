//! Carrier PWM - Phase-continuous gate-drive waveform engine
//!
//! This crate turns a duty or dual-compare command into complementary,
//! dead-time-protected gate signals, one `step()` per controller sample.
//! Frequency and phase changes are sequenced to period boundaries so the
//! carrier never jumps and no partial pulse is emitted.

use rustler::{Env, Term};

pub mod traits;
pub mod carriers;
pub mod deadtime;
pub mod actions;
pub mod sequencer;
pub mod config;
pub mod channel;
pub mod scheduling;
pub mod error;
pub mod nif;
mod utils;

// Re-export core types for convenience
pub use traits::{Carrier, CarrierSample, Direction, EdgeAction};
pub use carriers::{CarrierKind, CarrierShape, DirectOffsetCarrier, PhaseContinuousCarrier, PhaseMode};
pub use deadtime::{compute_thresholds, CompareCommand, DeadTime, EdgePair, Thresholds};
pub use actions::{ActionMode, ActionPolicy, CrossingDetection, GateLevels, GatePair, PolicyKind, ThresholdComparison};
pub use sequencer::UpdateSequencer;
pub use config::PwmConfig;
pub use channel::{ParameterUpdate, PwmChannel, PwmModule, PwmOutputs};
pub use scheduling::DelayedUpdate;
pub use error::{PwmError, Result};
pub use utils::{degrees_to_phase_offset, radians_to_phase_offset};

fn on_load(env: Env, _info: Term) -> bool {
    let _ = rustler::resource!(nif::PwmResource, env);
    true
}

rustler::init!(
    "Elixir.CarrierPwm.Native",
    [
        nif::pwm_new,
        nif::pwm_step,
        nif::pwm_step_dual,
        nif::pwm_step_many,
        nif::pwm_update,
        nif::pwm_reset,
    ],
    load = on_load
);
