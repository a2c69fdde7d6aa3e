//! Edge-action policies
//!
//! Two interchangeable ways of turning carrier position into gate states:
//! a stateless threshold comparison for center-aligned single compare, and
//! an edge-triggered crossing detector for dual compare with per-edge
//! actions.

mod crossing;
mod threshold;

pub use crossing::{ActionMode, CompareChannel, CrossingDetection, Edge};
pub use threshold::ThresholdComparison;

use serde::{Deserialize, Serialize};

use crate::deadtime::Thresholds;
use crate::traits::{CarrierSample, EdgeAction};

/// Logical state of the two gate outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatePair {
    pub a: bool,
    pub b: bool,
}

impl GatePair {
    /// Safe state: both gates off
    pub const OFF: Self = Self { a: false, b: false };

    /// Both gates at the same level
    #[inline]
    pub fn both(level: bool) -> Self {
        Self { a: level, b: level }
    }

    /// True if both gates conduct at once
    #[inline]
    pub fn overlap(&self) -> bool {
        self.a && self.b
    }
}

/// Output voltages for the two logical gate states
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateLevels {
    /// Output when a gate is on (volts)
    pub on: f64,
    /// Output when a gate is off (volts)
    pub off: f64,
}

impl Default for GateLevels {
    fn default() -> Self {
        Self { on: 1.0, off: 0.0 }
    }
}

impl GateLevels {
    /// Map a gate state to its output voltage
    #[inline]
    pub fn level(&self, state: bool) -> f64 {
        if state {
            self.on
        } else {
            self.off
        }
    }
}

/// Policy selection as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Stateless `position > lead` / `position < lag`
    #[default]
    Threshold,
    /// Edge-triggered latches with the given action mode
    Crossing(ActionMode),
}

/// Runtime-selected action policy
#[derive(Debug, Clone)]
pub enum ActionPolicy {
    Threshold(ThresholdComparison),
    Crossing(CrossingDetection),
}

impl ActionPolicy {
    /// Build the policy named in configuration
    pub fn build(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Threshold => Self::Threshold(ThresholdComparison),
            PolicyKind::Crossing(mode) => Self::Crossing(CrossingDetection::new(mode)),
        }
    }

    /// Configuration form of this policy
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Threshold(_) => PolicyKind::Threshold,
            Self::Crossing(c) => PolicyKind::Crossing(c.mode()),
        }
    }
}

impl EdgeAction for ActionPolicy {
    fn apply(&mut self, sample: &CarrierSample, thresholds: &Thresholds) -> GatePair {
        match self {
            Self::Threshold(p) => p.apply(sample, thresholds),
            Self::Crossing(p) => p.apply(sample, thresholds),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Threshold(p) => p.reset(),
            Self::Crossing(p) => p.reset(),
        }
    }
}
