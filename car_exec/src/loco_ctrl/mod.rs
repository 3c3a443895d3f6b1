//! Locomotion control module
//!
//! Turns a normalised [`MotionCommand`] into signed duty demands for the two wheels and issues
//! them to a [`MotorDriver`](crate::eqpt::MotorDriver).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod calc_mix;
mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use calc_mix::mix;
pub use comms_if::tc::loco_ctrl::MotionCommand;
pub use params::*;
pub use state::*;
