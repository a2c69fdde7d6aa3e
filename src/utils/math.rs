//! Small timing helpers

use std::f64::consts::PI;

/// Convert a phase angle in degrees to a time offset in seconds
///
/// 360° corresponds to one full carrier period at `frequency`.
#[inline]
pub fn degrees_to_phase_offset(degrees: f64, frequency: f64) -> f64 {
    degrees / 360.0 / frequency
}

/// Convert a phase angle in radians to a time offset in seconds
#[inline]
pub fn radians_to_phase_offset(radians: f64, frequency: f64) -> f64 {
    radians / (2.0 * PI) / frequency
}

/// Wrap a time offset into [-period/2, period/2)
///
/// A shift by a whole period is no shift at all, so only the remainder
/// needs to be applied.
#[inline]
pub fn wrap_half_period(offset: f64, period: f64) -> f64 {
    let cycles = offset / period;
    (cycles - (cycles + 0.5).floor()) * period
}
