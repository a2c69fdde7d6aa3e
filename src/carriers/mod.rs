//! Carrier generator implementations
//!
//! `PhaseContinuousCarrier` is the reference carrier: frequency and phase
//! changes go through the update sequencer and never make the position
//! jump. `DirectOffsetCarrier` is the legacy time-formula carrier where a
//! phase or frequency change takes effect instantly.

mod continuous;
mod direct;
mod shape;

pub use continuous::PhaseContinuousCarrier;
pub use direct::DirectOffsetCarrier;
pub use shape::CarrierShape;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::{Carrier, CarrierSample};

/// Counter wrap tolerance in cycles
///
/// A step of exactly one period must register as a wrap even when
/// `dt * f` rounds to just below 1.0.
pub const WRAP_TOLERANCE: f64 = 1e-9;

/// How phase and frequency changes reach the carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMode {
    /// Deferred to period boundaries, phase applied by a warp cycle
    #[default]
    Continuous,
    /// Legacy: applied instantly as a carrier offset
    Immediate,
}

/// Runtime-selected carrier
#[derive(Debug, Clone)]
pub enum CarrierKind {
    Continuous(PhaseContinuousCarrier),
    Direct(DirectOffsetCarrier),
}

impl CarrierKind {
    /// Build the carrier for a phase mode
    pub fn build(
        mode: PhaseMode,
        shape: CarrierShape,
        freq_hz: f64,
        phase_offset: f64,
        sync_enable: bool,
    ) -> Result<Self> {
        Ok(match mode {
            PhaseMode::Continuous => Self::Continuous(
                PhaseContinuousCarrier::new(shape, freq_hz)?
                    .with_phase_offset(phase_offset)
                    .with_sync(sync_enable),
            ),
            PhaseMode::Immediate => Self::Direct(
                DirectOffsetCarrier::new(shape, freq_hz)?
                    .with_phase_offset(phase_offset)
                    .with_sync(sync_enable),
            ),
        })
    }

    /// Phase mode of the wrapped carrier
    pub fn phase_mode(&self) -> PhaseMode {
        match self {
            Self::Continuous(_) => PhaseMode::Continuous,
            Self::Direct(_) => PhaseMode::Immediate,
        }
    }

    fn inner(&self) -> &dyn Carrier {
        match self {
            Self::Continuous(c) => c,
            Self::Direct(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Carrier {
        match self {
            Self::Continuous(c) => c,
            Self::Direct(c) => c,
        }
    }
}

impl Carrier for CarrierKind {
    fn advance(&mut self, time: f64, sync_in: bool) -> CarrierSample {
        self.inner_mut().advance(time, sync_in)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn shape(&self) -> CarrierShape {
        self.inner().shape()
    }

    fn frequency(&self) -> f64 {
        self.inner().frequency()
    }

    fn nominal_frequency(&self) -> f64 {
        self.inner().nominal_frequency()
    }

    fn request_frequency(&mut self, freq_hz: f64) -> Result<()> {
        self.inner_mut().request_frequency(freq_hz)
    }

    fn request_phase(&mut self, phase_offset: f64) {
        self.inner_mut().request_phase(phase_offset)
    }

    fn phase_offset(&self) -> f64 {
        self.inner().phase_offset()
    }

    fn set_sync_enable(&mut self, enable: bool) {
        self.inner_mut().set_sync_enable(enable)
    }
}
