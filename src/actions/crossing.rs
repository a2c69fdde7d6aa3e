//! Crossing-detection policy
//!
//! Each gate is a latch driven by compare events, like the action
//! qualifier of a hardware PWM timer. An event is the carrier passing a
//! threshold while moving in a given direction:
//!
//! ```text
//! rising:  prev <  x <= pos
//! falling: prev >  x >= pos
//! ```
//!
//! The action mode names the set and clear events of gate A. Gate A turns
//! on late and off early by the dead time. Gate B uses the same events
//! with lead/lag exchanged and set/clear swapped, which makes it the
//! dead-time-protected complement of A.
//!
//! Thresholds may move between samples. A clear whose threshold jumped
//! behind the carrier still fires once the carrier is past it, and the
//! latches are interlocked: setting one gate clears the other.

use serde::{Deserialize, Serialize};

use crate::deadtime::{EdgePair, Thresholds};
use crate::traits::{CarrierSample, Direction, EdgeAction};

use super::GatePair;

/// Compare register an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareChannel {
    A,
    B,
}

/// A compare event: threshold channel plus carrier direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub channel: CompareChannel,
    pub direction: Direction,
}

/// Set/clear assignment for gate A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    /// Set on down-count crossing of B, clear on up-count crossing of A
    #[default]
    SetDownBClearUpA,
    /// Set on down-count crossing of A, clear on up-count crossing of B
    SetDownAClearUpB,
}

impl ActionMode {
    /// Event that turns gate A on
    pub fn set_edge(self) -> Edge {
        let channel = match self {
            Self::SetDownBClearUpA => CompareChannel::B,
            Self::SetDownAClearUpB => CompareChannel::A,
        };
        Edge {
            channel,
            direction: Direction::Falling,
        }
    }

    /// Event that turns gate A off
    pub fn clear_edge(self) -> Edge {
        let channel = match self {
            Self::SetDownBClearUpA => CompareChannel::A,
            Self::SetDownAClearUpB => CompareChannel::B,
        };
        Edge {
            channel,
            direction: Direction::Rising,
        }
    }
}

fn edge_pair(thresholds: &Thresholds, channel: CompareChannel) -> EdgePair {
    match channel {
        CompareChannel::A => thresholds.a,
        CompareChannel::B => thresholds.b,
    }
}

/// Threshold reached later than the nominal compare when moving in `direction`
#[inline]
fn delayed(pair: EdgePair, direction: Direction) -> f64 {
    match direction {
        Direction::Rising => pair.lead,
        Direction::Falling => pair.lag,
    }
}

/// Threshold reached earlier than the nominal compare when moving in `direction`
#[inline]
fn advanced(pair: EdgePair, direction: Direction) -> f64 {
    match direction {
        Direction::Rising => pair.lag,
        Direction::Falling => pair.lead,
    }
}

/// Monotonic piece of carrier motion between two samples
#[derive(Debug, Clone, Copy)]
struct Segment {
    from: f64,
    to: f64,
    direction: Direction,
}

impl Segment {
    #[inline]
    fn crosses(&self, threshold: f64, direction: Direction) -> bool {
        if self.direction != direction {
            return false;
        }
        match direction {
            Direction::Rising => self.from < threshold && threshold <= self.to,
            Direction::Falling => self.from > threshold && threshold >= self.to,
        }
    }

    /// Ends at or beyond `threshold` while moving in `direction`
    #[inline]
    fn reaches(&self, threshold: f64, direction: Direction) -> bool {
        if self.direction != direction {
            return false;
        }
        match direction {
            Direction::Rising => self.to >= threshold,
            Direction::Falling => self.to <= threshold,
        }
    }
}

/// Split the motion since the previous sample into monotonic segments
///
/// A triangle that turned around at its apex or valley, or a sawtooth that
/// wrapped, is not monotonic between the two samples.
fn segments(prev: (f64, Direction), sample: &CarrierSample) -> [Option<Segment>; 2] {
    let (prev_pos, prev_dir) = prev;

    if sample.period_boundary && sample.shape.wraps_discontinuously() {
        let (end, start) = match sample.direction {
            Direction::Rising => (1.0, 0.0),
            Direction::Falling => (0.0, 1.0),
        };
        return [
            Some(Segment {
                from: prev_pos,
                to: end,
                direction: sample.direction,
            }),
            Some(Segment {
                from: start,
                to: sample.position,
                direction: sample.direction,
            }),
        ];
    }

    if prev_dir != sample.direction {
        let turn = match prev_dir {
            Direction::Rising => 1.0,
            Direction::Falling => 0.0,
        };
        return [
            Some(Segment {
                from: prev_pos,
                to: turn,
                direction: prev_dir,
            }),
            Some(Segment {
                from: turn,
                to: sample.position,
                direction: sample.direction,
            }),
        ];
    }

    [
        Some(Segment {
            from: prev_pos,
            to: sample.position,
            direction: sample.direction,
        }),
        None,
    ]
}

/// Edge-triggered gate latches
#[derive(Debug, Clone)]
pub struct CrossingDetection {
    mode: ActionMode,
    previous: Option<(f64, Direction)>,
    latched: GatePair,
}

impl CrossingDetection {
    /// Create a detector with both gates off and no edge history
    pub fn new(mode: ActionMode) -> Self {
        Self {
            mode,
            previous: None,
            latched: GatePair::OFF,
        }
    }

    /// Configured action mode
    pub fn mode(&self) -> ActionMode {
        self.mode
    }

    /// Current latch state
    pub fn latched(&self) -> GatePair {
        self.latched
    }
}

impl EdgeAction for CrossingDetection {
    fn apply(&mut self, sample: &CarrierSample, thresholds: &Thresholds) -> GatePair {
        // No valid history on the first step: seed it and stay off
        let Some(prev) = self.previous.replace((sample.position, sample.direction)) else {
            self.latched = GatePair::OFF;
            return self.latched;
        };

        if let Some(level) = thresholds.forced_level() {
            self.latched = GatePair::both(level);
            return self.latched;
        }

        let set = self.mode.set_edge();
        let clear = self.mode.clear_edge();
        let set_pair = edge_pair(thresholds, set.channel);
        let clear_pair = edge_pair(thresholds, clear.channel);

        let a_on = delayed(set_pair, set.direction);
        let a_off = advanced(clear_pair, clear.direction);
        let b_off = advanced(set_pair, set.direction);
        let b_on = delayed(clear_pair, clear.direction);

        // Leaving a forced-on state
        if self.latched.overlap() {
            self.latched = GatePair::OFF;
        }

        for segment in segments(prev, sample).iter().flatten() {
            if segment.reaches(b_off, set.direction) {
                self.latched.b = false;
            }
            if segment.crosses(a_on, set.direction) {
                self.latched.a = true;
                self.latched.b = false;
            }
            if segment.reaches(a_off, clear.direction) {
                self.latched.a = false;
            }
            if segment.crosses(b_on, clear.direction) {
                self.latched.b = true;
                self.latched.a = false;
            }
        }

        self.latched
    }

    fn reset(&mut self) {
        self.previous = None;
        self.latched = GatePair::OFF;
    }
}
