//! Direct-offset carrier (legacy)
//!
//! Position is a pure function of time: `frac(t * f + φ * f)`. Phase and
//! frequency changes take effect on the very next sample, which can cut a
//! pulse short. Kept for hosts that expect the old immediate behavior.

use tracing::debug;

use crate::error::{check_frequency, Result};
use crate::traits::{Carrier, CarrierSample};

use super::{CarrierShape, WRAP_TOLERANCE};

/// Stateless-formula carrier with an immediate phase offset
#[derive(Debug, Clone)]
pub struct DirectOffsetCarrier {
    shape: CarrierShape,
    freq_hz: f64,
    phase_offset: f64,
    sync_enable: bool,
    sync_cycles: f64,
    last_time: f64,
    last_index: Option<f64>,
}

impl DirectOffsetCarrier {
    /// Create a carrier
    ///
    /// # Arguments
    /// * `shape` - Carrier waveform
    /// * `freq_hz` - Switching frequency in Hz, must be positive
    pub fn new(shape: CarrierShape, freq_hz: f64) -> Result<Self> {
        let freq_hz = check_frequency(freq_hz)?;
        Ok(Self {
            shape,
            freq_hz,
            phase_offset: 0.0,
            sync_enable: false,
            sync_cycles: 0.0,
            last_time: 0.0,
            last_index: None,
        })
    }

    /// Start with a phase offset (seconds)
    pub fn with_phase_offset(mut self, phase_offset: f64) -> Self {
        self.request_phase(phase_offset);
        self
    }

    /// Enable the external sync input
    pub fn with_sync(mut self, enable: bool) -> Self {
        self.sync_enable = enable;
        self
    }

    fn cycles_at(&self, time: f64) -> f64 {
        (time + self.phase_offset) * self.freq_hz - self.sync_cycles
    }
}

impl Carrier for DirectOffsetCarrier {
    fn advance(&mut self, time: f64, sync_in: bool) -> CarrierSample {
        let time = if time.is_finite() {
            time.max(self.last_time)
        } else {
            self.last_time
        };
        self.last_time = time;

        let synced = self.sync_enable && sync_in;
        if synced {
            self.sync_cycles = (time + self.phase_offset) * self.freq_hz;
            self.last_index = Some(0.0);
        }

        let cycles = self.cycles_at(time);
        let index = (cycles + WRAP_TOLERANCE).floor();
        let counter = (cycles - index).max(0.0);

        let period_boundary = synced || matches!(self.last_index, Some(prev) if index > prev);
        self.last_index = Some(index);

        let (position, direction) = self.shape.sample(counter);
        CarrierSample {
            position,
            direction,
            period_boundary,
            counter,
            shape: self.shape,
        }
    }

    fn reset(&mut self) {
        self.sync_cycles = 0.0;
        self.last_time = 0.0;
        self.last_index = None;
    }

    fn shape(&self) -> CarrierShape {
        self.shape
    }

    fn frequency(&self) -> f64 {
        self.freq_hz
    }

    fn nominal_frequency(&self) -> f64 {
        self.freq_hz
    }

    fn request_frequency(&mut self, freq_hz: f64) -> Result<()> {
        self.freq_hz = check_frequency(freq_hz)?;
        debug!(freq_hz, "carrier frequency applied immediately");
        Ok(())
    }

    fn request_phase(&mut self, phase_offset: f64) {
        if phase_offset.is_finite() {
            self.phase_offset = phase_offset;
        }
    }

    fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    fn set_sync_enable(&mut self, enable: bool) {
        self.sync_enable = enable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_follows_time() {
        let mut carrier = DirectOffsetCarrier::new(CarrierShape::SawtoothUp, 100e3).unwrap();
        let s = carrier.advance(2.5e-6, false);
        assert!((s.position - 0.25).abs() < 1e-9);
        let s = carrier.advance(12.5e-6, false);
        assert!((s.position - 0.25).abs() < 1e-9);
        assert!(s.period_boundary);
    }

    #[test]
    fn test_phase_applies_immediately() {
        let mut carrier = DirectOffsetCarrier::new(CarrierShape::SawtoothUp, 100e3).unwrap();
        let before = carrier.advance(1e-6, false);
        carrier.request_phase(5e-6);
        let after = carrier.advance(1e-6, false);

        // Half a period jump on the same timestamp
        assert!((before.counter - 0.1).abs() < 1e-9);
        assert!((after.counter - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_on_exact_period() {
        let freq = 50e3;
        let mut carrier = DirectOffsetCarrier::new(CarrierShape::Triangular, freq).unwrap();
        assert!(!carrier.advance(0.0, false).period_boundary);
        assert!(!carrier.advance(0.5 / freq, false).period_boundary);
        assert!(carrier.advance(1.0 / freq, false).period_boundary);
        assert!(!carrier.advance(1.5 / freq, false).period_boundary);
    }

    #[test]
    fn test_sync_rezeroes() {
        let mut carrier = DirectOffsetCarrier::new(CarrierShape::SawtoothUp, 100e3)
            .unwrap()
            .with_sync(true);
        carrier.advance(3e-6, false);
        let s = carrier.advance(4e-6, true);
        assert!(s.counter.abs() < 1e-9);
        assert!(s.period_boundary, "sync re-zero must report a boundary");
        let s = carrier.advance(6e-6, false);
        assert!((s.counter - 0.2).abs() < 1e-9);
        assert!(!s.period_boundary);
    }

    #[test]
    fn test_backward_time_clamped() {
        let mut carrier = DirectOffsetCarrier::new(CarrierShape::SawtoothUp, 100e3).unwrap();
        let a = carrier.advance(4e-6, false);
        let b = carrier.advance(2e-6, false);
        assert_eq!(a.counter, b.counter);
    }
}
