//! Utility functions shared by the carrier and compare stages

mod clamp;
mod math;

pub use clamp::clamp_unit;
pub use math::*;
