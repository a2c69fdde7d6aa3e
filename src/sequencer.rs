//! Parameter update sequencer
//!
//! Decides *when* a requested frequency or phase change reaches the
//! carrier counter. Frequency changes wait for the next period boundary.
//! Phase changes are realised as a one-cycle frequency warp: the cycle that
//! starts at a boundary runs at
//!
//! ```text
//! f_warp = Fs / (1 - Fs * Δφ)
//! ```
//!
//! so it is `Δφ` seconds shorter (or longer) than nominal, after which the
//! nominal rate is restored. The carrier ends up `Δφ` ahead without ever
//! jumping, so no partial pulse is emitted.

use tracing::{debug, trace};

use crate::error::{check_frequency, Result};
use crate::utils::wrap_half_period;

/// Phase differences below this (seconds) are not worth a warp cycle
pub const PHASE_EPSILON: f64 = 1e-12;

/// Frequency and phase bookkeeping for one carrier
#[derive(Debug, Clone)]
pub struct UpdateSequencer {
    nominal_freq: f64,
    active_freq: f64,
    pending_freq: f64,
    change_pending: bool,
    target_phase: f64,
    applied_phase: f64,
    started: bool,
    cold: bool,
}

impl UpdateSequencer {
    /// Create a sequencer running at `freq_hz` with no phase offset applied
    ///
    /// The frequency must already be validated.
    pub fn new(freq_hz: f64) -> Self {
        Self {
            nominal_freq: freq_hz,
            active_freq: freq_hz,
            pending_freq: freq_hz,
            change_pending: false,
            target_phase: 0.0,
            applied_phase: 0.0,
            started: false,
            cold: true,
        }
    }

    /// Queue a new nominal frequency
    ///
    /// Applied at the next period boundary, or immediately while the
    /// carrier has not completed a cycle yet. A first-cycle warp already
    /// running keeps its rate and restores to the new frequency.
    pub fn request_frequency(&mut self, freq_hz: f64) -> Result<()> {
        let freq_hz = check_frequency(freq_hz)?;
        self.nominal_freq = freq_hz;

        if self.cold && self.change_pending {
            self.pending_freq = freq_hz;
        } else if self.cold {
            self.active_freq = freq_hz;
            self.pending_freq = freq_hz;
        } else {
            self.pending_freq = freq_hz;
            self.change_pending = true;
        }
        debug!(freq_hz, cold = self.cold, "carrier frequency requested");
        Ok(())
    }

    /// Set the target phase offset (seconds)
    ///
    /// NaN means "no change". The difference to the phase already applied
    /// is realised by a warp cycle at a later boundary.
    pub fn request_phase(&mut self, phase_offset: f64) {
        if phase_offset.is_finite() {
            self.target_phase = phase_offset;
        }
    }

    /// Called once before the first cycle runs
    ///
    /// The start of the very first cycle counts as a boundary for phase
    /// warps, so an initial offset is applied during cycle one.
    pub fn begin(&mut self) {
        if !self.started {
            self.started = true;
            self.start_warp();
        }
    }

    /// Called by the carrier each time its counter wraps
    ///
    /// Returns true if the active frequency changed.
    pub fn on_period_boundary(&mut self) -> bool {
        self.started = true;
        self.cold = false;

        // A pending change (including the end of a warp) wins; any new warp
        // waits for the following boundary.
        if self.change_pending {
            let previous = self.active_freq;
            self.active_freq = self.pending_freq;
            self.change_pending = false;
            trace!(
                from = previous,
                to = self.active_freq,
                "frequency change applied at boundary"
            );
            return previous != self.active_freq;
        }

        self.start_warp()
    }

    fn start_warp(&mut self) -> bool {
        let period = 1.0 / self.nominal_freq;
        let diff = wrap_half_period(self.target_phase - self.applied_phase, period);
        if diff.abs() <= PHASE_EPSILON {
            return false;
        }

        let warp_freq = self.nominal_freq / (1.0 - self.nominal_freq * diff);
        self.active_freq = warp_freq;
        self.pending_freq = self.nominal_freq;
        self.change_pending = true;
        self.applied_phase = self.target_phase;

        debug!(
            phase_shift = diff,
            warp_freq, "phase warp cycle started"
        );
        true
    }

    /// Return to power-up state
    ///
    /// Nominal frequency and target phase are configuration and survive;
    /// the applied phase is forgotten so the offset is re-applied on the
    /// first cycle after reset.
    pub fn reset(&mut self) {
        self.active_freq = self.nominal_freq;
        self.pending_freq = self.nominal_freq;
        self.change_pending = false;
        self.applied_phase = 0.0;
        self.started = false;
        self.cold = true;
    }

    /// Frequency driving the counter right now (Hz)
    pub fn active_frequency(&self) -> f64 {
        self.active_freq
    }

    /// Configured frequency (Hz)
    pub fn nominal_frequency(&self) -> f64 {
        self.nominal_freq
    }

    /// Frequency queued for the next boundary, if any
    pub fn pending_frequency(&self) -> Option<f64> {
        self.change_pending.then_some(self.pending_freq)
    }

    /// Requested phase offset (seconds)
    pub fn target_phase(&self) -> f64 {
        self.target_phase
    }

    /// Phase offset already realised or being realised (seconds)
    pub fn applied_phase(&self) -> f64 {
        self.applied_phase
    }

    /// True once the carrier has advanced at least once
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True until the first period boundary
    pub fn is_cold(&self) -> bool {
        self.cold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cold_frequency_applies_immediately() {
        let mut seq = UpdateSequencer::new(50e3);
        seq.request_frequency(100e3).unwrap();
        assert_eq!(seq.active_frequency(), 100e3);
        assert_eq!(seq.pending_frequency(), None);
    }

    #[test]
    fn test_first_cycle_frequency_applies_immediately() {
        let mut seq = UpdateSequencer::new(50e3);
        seq.begin();
        assert!(seq.is_started());
        assert!(seq.is_cold());

        seq.request_frequency(100e3).unwrap();
        assert_eq!(seq.active_frequency(), 100e3);
        assert_eq!(seq.pending_frequency(), None);
    }

    #[test]
    fn test_first_cycle_warp_restores_to_new_frequency() {
        let fs = 50e3;
        let mut seq = UpdateSequencer::new(fs);
        seq.request_phase(0.25 / fs);
        seq.begin();
        let warp = seq.active_frequency();

        seq.request_frequency(40e3).unwrap();
        assert_eq!(seq.active_frequency(), warp);
        assert_eq!(seq.pending_frequency(), Some(40e3));

        seq.on_period_boundary();
        assert_eq!(seq.active_frequency(), 40e3);
    }

    #[test]
    fn test_running_frequency_deferred_to_boundary() {
        let mut seq = UpdateSequencer::new(50e3);
        seq.begin();
        seq.on_period_boundary();
        seq.request_frequency(100e3).unwrap();

        assert_eq!(seq.active_frequency(), 50e3);
        assert_eq!(seq.pending_frequency(), Some(100e3));

        assert!(seq.on_period_boundary());
        assert_eq!(seq.active_frequency(), 100e3);
        assert_eq!(seq.pending_frequency(), None);
    }

    #[test]
    fn test_invalid_frequency_keeps_previous() {
        let mut seq = UpdateSequencer::new(50e3);
        seq.begin();
        assert!(seq.request_frequency(0.0).is_err());
        assert!(seq.request_frequency(-10.0).is_err());
        assert_eq!(seq.nominal_frequency(), 50e3);
        assert_eq!(seq.pending_frequency(), None);
    }

    #[test]
    fn test_quarter_period_warp() {
        let fs = 50e3;
        let mut seq = UpdateSequencer::new(fs);
        seq.request_phase(0.25 / fs);
        seq.begin();

        let expected = fs / 0.75;
        assert!(
            (seq.active_frequency() - expected).abs() < 1e-6,
            "warp frequency {} expected {}",
            seq.active_frequency(),
            expected
        );
        assert_eq!(seq.pending_frequency(), Some(fs));

        // Next boundary restores nominal
        seq.on_period_boundary();
        assert_eq!(seq.active_frequency(), fs);

        // And nothing else happens afterwards
        assert!(!seq.on_period_boundary());
        assert_eq!(seq.active_frequency(), fs);
    }

    #[test]
    fn test_phase_delay_slows_carrier() {
        let fs = 100e3;
        let mut seq = UpdateSequencer::new(fs);
        seq.begin();
        seq.request_phase(-2.5e-6);
        seq.on_period_boundary();
        assert!((seq.active_frequency() - fs / 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_nan_phase_is_no_change() {
        let mut seq = UpdateSequencer::new(100e3);
        seq.request_phase(1e-6);
        seq.request_phase(f64::NAN);
        assert_eq!(seq.target_phase(), 1e-6);
    }

    #[test]
    fn test_only_difference_is_warped() {
        let fs = 100e3;
        let mut seq = UpdateSequencer::new(fs);
        seq.request_phase(1e-6);
        seq.begin();
        seq.on_period_boundary(); // restore

        seq.request_phase(3e-6);
        seq.on_period_boundary();
        let expected = fs / (1.0 - fs * 2e-6);
        assert!((seq.active_frequency() - expected).abs() < 1e-6);
        assert_eq!(seq.applied_phase(), 3e-6);
    }

    #[test]
    fn test_pending_change_defers_new_warp() {
        let fs = 100e3;
        let mut seq = UpdateSequencer::new(fs);
        seq.begin();
        seq.on_period_boundary();

        seq.request_frequency(80e3).unwrap();
        seq.request_phase(2e-6);

        // Frequency change wins this boundary
        seq.on_period_boundary();
        assert_eq!(seq.active_frequency(), 80e3);
        assert_eq!(seq.applied_phase(), 0.0);

        // Warp starts on the following one, based on the new nominal
        seq.on_period_boundary();
        let expected = 80e3 / (1.0 - 80e3 * 2e-6);
        assert!((seq.active_frequency() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_reset_reapplies_phase() {
        let fs = 100e3;
        let mut seq = UpdateSequencer::new(fs);
        seq.request_phase(2e-6);
        seq.begin();
        seq.on_period_boundary();

        seq.reset();
        assert!(seq.is_cold());
        assert!(!seq.is_started());
        assert_eq!(seq.active_frequency(), fs);
        assert_eq!(seq.applied_phase(), 0.0);
        assert_eq!(seq.target_phase(), 2e-6);

        seq.begin();
        assert!(seq.active_frequency() > fs);
    }
}
