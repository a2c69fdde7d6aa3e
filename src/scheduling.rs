//! Delayed parameter updates
//!
//! A controller computes a new duty at one instant but the timer registers
//! only see it after the processing delay. `DelayedUpdate` holds the most
//! recent update and releases it once that delay has elapsed, so the
//! channel keeps running on the old values in between.

use tracing::{debug, trace};

use crate::channel::{ParameterUpdate, PwmChannel, PwmOutputs};
use crate::traits::{Carrier, EdgeAction};

/// One-slot update queue with a fixed release delay
#[derive(Debug, Clone, Default)]
pub struct DelayedUpdate {
    delay: f64,
    pending: Option<(f64, ParameterUpdate)>,
}

impl DelayedUpdate {
    /// Create a queue releasing updates `delay` seconds after scheduling
    ///
    /// Negative or non-finite delays release on the next poll.
    pub fn new(delay: f64) -> Self {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        Self {
            delay,
            pending: None,
        }
    }

    /// Hold `update`, computed at `time`, until the delay has passed
    ///
    /// Replaces any update still waiting.
    pub fn schedule(&mut self, time: f64, update: ParameterUpdate) {
        if self.pending.is_some() {
            trace!(time, "superseding pending update");
        }
        self.pending = Some((time, update));
    }

    /// Take the held update if it is due at `time`
    pub fn poll(&mut self, time: f64) -> Option<ParameterUpdate> {
        match self.pending {
            Some((scheduled, update)) if time - scheduled >= self.delay => {
                self.pending = None;
                Some(update)
            }
            _ => None,
        }
    }

    /// Apply a due update to `channel`, then step it
    pub fn step<K, A>(&mut self, channel: &mut PwmChannel<K, A>, time: f64, sync_in: bool) -> PwmOutputs
    where
        K: Carrier,
        A: EdgeAction,
    {
        if let Some(update) = self.poll(time) {
            if let Err(err) = channel.update_parameters(update) {
                debug!(%err, time, "delayed update partially applied");
            }
        }
        channel.step(time, sync_in)
    }

    /// Drop any held update
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release delay (seconds)
    pub fn delay(&self) -> f64 {
        self.delay
    }
}
