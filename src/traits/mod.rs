//! Core traits for the gate-drive pipeline
//!
//! Each trait covers one orthogonal axis of a PWM channel: the carrier
//! that turns time into a normalized position, and the action policy that
//! turns position plus thresholds into gate states.

mod action;
mod carrier;

pub use action::EdgeAction;
pub use carrier::{Carrier, CarrierSample, Direction};
