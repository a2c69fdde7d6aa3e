//! Threshold-comparison policy
//!
//! Used with center-aligned single compare. Gate A conducts while the
//! carrier is above the lead threshold, gate B while it is below the lag
//! threshold; the band between them is the dead time. Recomputed from
//! scratch every step, so it can never latch a glitch.

use crate::deadtime::Thresholds;
use crate::traits::{CarrierSample, EdgeAction};

use super::GatePair;

/// Stateless comparison of carrier position against channel A thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdComparison;

impl EdgeAction for ThresholdComparison {
    fn apply(&mut self, sample: &CarrierSample, thresholds: &Thresholds) -> GatePair {
        let edges = thresholds.a;
        if let Some(level) = edges.collapsed() {
            return GatePair::both(level);
        }

        GatePair {
            a: sample.position > edges.lead,
            b: sample.position < edges.lag,
        }
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carriers::CarrierShape;
    use crate::deadtime::{compute_thresholds, CompareCommand, DeadTime, EdgePair};
    use crate::traits::Direction;

    fn sample(position: f64) -> CarrierSample {
        CarrierSample {
            position,
            direction: Direction::Rising,
            period_boundary: false,
            counter: 0.5 + position / 2.0,
            shape: CarrierShape::Triangular,
        }
    }

    #[test]
    fn test_dead_band() {
        let t = compute_thresholds(CompareCommand::Single(0.5), &DeadTime::Symmetric(1e-6), 100e3);
        let mut policy = ThresholdComparison;

        assert_eq!(policy.apply(&sample(0.9), &t), GatePair { a: true, b: false });
        assert_eq!(policy.apply(&sample(0.1), &t), GatePair { a: false, b: true });
        // Inside the 0.45..0.55 band both are off
        assert_eq!(policy.apply(&sample(0.5), &t), GatePair::OFF);
        assert_eq!(policy.apply(&sample(0.46), &t), GatePair::OFF);
    }

    #[test]
    fn test_never_overlaps() {
        let dt = DeadTime::Symmetric(200e-9);
        let mut policy = ThresholdComparison;
        for d in 1..100 {
            let t = compute_thresholds(CompareCommand::Single(d as f64 / 100.0), &dt, 100e3);
            for p in 0..=200 {
                let gates = policy.apply(&sample(p as f64 / 200.0), &t);
                if t.a.collapsed().is_none() {
                    assert!(!gates.overlap(), "overlap at duty {} position {}", d, p);
                }
            }
        }
    }

    #[test]
    fn test_collapsed_levels() {
        let mut policy = ThresholdComparison;
        let off = Thresholds {
            a: EdgePair::OFF,
            b: EdgePair::OFF,
        };
        let on = Thresholds {
            a: EdgePair::ON,
            b: EdgePair::ON,
        };
        for p in 0..=10 {
            let s = sample(p as f64 / 10.0);
            assert_eq!(policy.apply(&s, &off), GatePair::OFF);
            assert_eq!(policy.apply(&s, &on), GatePair::both(true));
        }
    }
}
