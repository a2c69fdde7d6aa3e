//! Carrier waveform shapes
//!
//! A shape maps the fractional cycle count onto a normalized position.

use serde::{Deserialize, Serialize};

use crate::traits::Direction;
use crate::utils::clamp_unit;

/// Carrier waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierShape {
    /// Center-aligned up/down carrier, apex at the period boundary
    #[default]
    Triangular,
    /// Ramp from 0 to 1, then jump back to 0
    SawtoothUp,
    /// Ramp from 1 to 0, then jump back to 1
    SawtoothDown,
}

impl CarrierShape {
    /// Position and slope for a fractional cycle count in [0, 1)
    ///
    /// The triangle is `|2(c - 0.5)|`: it descends from 1 to 0 over the
    /// first half cycle and climbs back over the second.
    #[inline]
    pub fn sample(self, counter: f64) -> (f64, Direction) {
        match self {
            Self::Triangular => {
                let position = clamp_unit((2.0 * (counter - 0.5)).abs());
                let direction = if counter < 0.5 {
                    Direction::Falling
                } else {
                    Direction::Rising
                };
                (position, direction)
            }
            Self::SawtoothUp => (clamp_unit(counter), Direction::Rising),
            Self::SawtoothDown => (clamp_unit(1.0 - counter), Direction::Falling),
        }
    }

    /// True if the position jumps at the period boundary
    #[inline]
    pub fn wraps_discontinuously(self) -> bool {
        !matches!(self, Self::Triangular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_shape() {
        let shape = CarrierShape::Triangular;
        assert_eq!(shape.sample(0.0), (1.0, Direction::Falling));
        assert_eq!(shape.sample(0.25), (0.5, Direction::Falling));
        assert_eq!(shape.sample(0.5), (0.0, Direction::Rising));
        assert_eq!(shape.sample(0.75), (0.5, Direction::Rising));
    }

    #[test]
    fn test_sawtooth_shapes() {
        assert_eq!(CarrierShape::SawtoothUp.sample(0.3), (0.3, Direction::Rising));
        let (pos, dir) = CarrierShape::SawtoothDown.sample(0.3);
        assert!((pos - 0.7).abs() < 1e-12);
        assert_eq!(dir, Direction::Falling);
    }

    #[test]
    fn test_shape_bounded() {
        for shape in [
            CarrierShape::Triangular,
            CarrierShape::SawtoothUp,
            CarrierShape::SawtoothDown,
        ] {
            for i in 0..1000 {
                let (pos, _) = shape.sample(i as f64 / 1000.0);
                assert!((0.0..=1.0).contains(&pos), "{:?} position {}", shape, pos);
            }
        }
    }
}
