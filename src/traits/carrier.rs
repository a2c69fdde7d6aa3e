//! Carrier trait - time to normalized carrier position
//!
//! Pure timing. No knowledge of compare values or gates.

use crate::carriers::CarrierShape;
use crate::error::Result;

/// Slope of the carrier at the current sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Position is increasing (up-count)
    #[default]
    Rising,
    /// Position is decreasing (down-count)
    Falling,
}

/// One carrier observation produced by [`Carrier::advance`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierSample {
    /// Normalized carrier value in [0, 1]
    pub position: f64,
    /// Carrier slope at this sample
    pub direction: Direction,
    /// The counter wrapped during this step
    pub period_boundary: bool,
    /// Fractional cycle count in [0, 1)
    pub counter: f64,
    /// Waveform the position was derived from
    pub shape: CarrierShape,
}

/// Carrier generator trait
///
/// Implementations map absolute time onto a periodic normalized carrier
/// and own the bookkeeping needed for runtime frequency and phase changes.
pub trait Carrier: Send + Sync {
    /// Advance the carrier to `time` (seconds)
    ///
    /// Time that moves backward is clamped; the carrier never runs in
    /// reverse. `sync_in` re-zeroes the counter when external sync is
    /// enabled.
    fn advance(&mut self, time: f64, sync_in: bool) -> CarrierSample;

    /// Return to power-up state, keeping configuration
    fn reset(&mut self);

    /// Waveform produced by this carrier
    fn shape(&self) -> CarrierShape;

    /// Frequency currently driving the counter (Hz)
    fn frequency(&self) -> f64;

    /// Configured switching frequency (Hz)
    fn nominal_frequency(&self) -> f64;

    /// Request a new switching frequency
    fn request_frequency(&mut self, freq_hz: f64) -> Result<()>;

    /// Request a new phase offset (seconds)
    fn request_phase(&mut self, phase_offset: f64);

    /// Most recently requested phase offset (seconds)
    fn phase_offset(&self) -> f64;

    /// Enable or disable the external sync input
    fn set_sync_enable(&mut self, enable: bool);
}
