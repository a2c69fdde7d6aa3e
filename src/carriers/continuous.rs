//! Phase-continuous carrier
//!
//! Accumulates `dt * f` into a fractional cycle counter. At a wrap only the
//! integer part is removed, so sub-step phase is never lost, and the update
//! sequencer is consulted so a new frequency starts exactly with the new
//! cycle.

use crate::error::{check_frequency, Result};
use crate::sequencer::UpdateSequencer;
use crate::traits::{Carrier, CarrierSample};

use super::{CarrierShape, WRAP_TOLERANCE};

/// Carrier driven by an accumulating cycle counter
#[derive(Debug, Clone)]
pub struct PhaseContinuousCarrier {
    shape: CarrierShape,
    sync_enable: bool,
    counter: f64,
    last_time: f64,
    sequencer: UpdateSequencer,
}

impl PhaseContinuousCarrier {
    /// Create a carrier
    ///
    /// # Arguments
    /// * `shape` - Carrier waveform
    /// * `freq_hz` - Switching frequency in Hz, must be positive
    pub fn new(shape: CarrierShape, freq_hz: f64) -> Result<Self> {
        let freq_hz = check_frequency(freq_hz)?;
        Ok(Self {
            shape,
            sync_enable: false,
            counter: 0.0,
            last_time: 0.0,
            sequencer: UpdateSequencer::new(freq_hz),
        })
    }

    /// Start with a phase offset (seconds), applied during the first cycle
    pub fn with_phase_offset(mut self, phase_offset: f64) -> Self {
        self.sequencer.request_phase(phase_offset);
        self
    }

    /// Enable the external sync input
    pub fn with_sync(mut self, enable: bool) -> Self {
        self.sync_enable = enable;
        self
    }

    /// Frequency/phase bookkeeping
    pub fn sequencer(&self) -> &UpdateSequencer {
        &self.sequencer
    }

    /// Fractional cycle count in [0, 1)
    pub fn counter(&self) -> f64 {
        self.counter
    }

    fn wrap(&mut self, step_freq: f64) {
        let mut remainder = (self.counter - (self.counter + WRAP_TOLERANCE).floor()).max(0.0);

        // The remainder was accumulated at the old rate; re-time it at the
        // rate that now applies so the new cycle starts exactly on the wrap.
        if self.sequencer.on_period_boundary() {
            remainder *= self.sequencer.active_frequency() / step_freq;
        }

        self.counter = remainder - remainder.floor();
    }
}

impl Carrier for PhaseContinuousCarrier {
    fn advance(&mut self, time: f64, sync_in: bool) -> CarrierSample {
        // A sync pulse re-zeroes the counter and counts as a period boundary
        let synced = self.sync_enable && sync_in;
        if synced {
            self.counter = 0.0;
            if time.is_finite() {
                self.last_time = time;
            }
            self.sequencer.on_period_boundary();
        }

        let dt = if time.is_finite() && time > self.last_time {
            let dt = time - self.last_time;
            self.last_time = time;
            dt
        } else {
            0.0
        };

        if !self.sequencer.is_started() {
            self.sequencer.begin();
        }

        let step_freq = self.sequencer.active_frequency();
        self.counter += dt * step_freq;

        let wrapped = self.counter >= 1.0 - WRAP_TOLERANCE;
        if wrapped {
            self.wrap(step_freq);
        }
        let period_boundary = synced || wrapped;

        let (position, direction) = self.shape.sample(self.counter);
        CarrierSample {
            position,
            direction,
            period_boundary,
            counter: self.counter,
            shape: self.shape,
        }
    }

    fn reset(&mut self) {
        self.counter = 0.0;
        self.last_time = 0.0;
        self.sequencer.reset();
    }

    fn shape(&self) -> CarrierShape {
        self.shape
    }

    fn frequency(&self) -> f64 {
        self.sequencer.active_frequency()
    }

    fn nominal_frequency(&self) -> f64 {
        self.sequencer.nominal_frequency()
    }

    fn request_frequency(&mut self, freq_hz: f64) -> Result<()> {
        self.sequencer.request_frequency(freq_hz)
    }

    fn request_phase(&mut self, phase_offset: f64) {
        self.sequencer.request_phase(phase_offset)
    }

    fn phase_offset(&self) -> f64 {
        self.sequencer.target_phase()
    }

    fn set_sync_enable(&mut self, enable: bool) {
        self.sync_enable = enable;
    }
}
