//! EdgeAction trait - carrier position to gate states
//!
//! Policies decide when each of the two gate outputs turns on or off.

use crate::actions::GatePair;
use crate::deadtime::Thresholds;
use crate::traits::CarrierSample;

/// Gate action policy
///
/// Implementations consume one carrier sample and the dead-time adjusted
/// thresholds for that step and return the logical state of both gates.
pub trait EdgeAction: Send + Sync {
    /// Compute gate states for this step
    fn apply(&mut self, sample: &CarrierSample, thresholds: &Thresholds) -> GatePair;

    /// Forget edge history and return to the safe (off) state
    fn reset(&mut self);
}
