//! # Locomotion control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A normalised feed-forward motion demand for the car body.
///
/// This is an intent, not a velocity target: the values are mapped straight onto motor duty by
/// locomotion control.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MotionCommand {
    /// Forwards (positive) or backwards (negative) drive, in the range `[-1, 1]`.
    pub linear: f64,

    /// Turn demand, in the range `[-1, 1]` for manual driving.
    ///
    /// Follows the right hand rule about the car's upwards axis, so that a positive value turns
    /// the car to the left (counter-clockwise).
    pub angular: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotionCommand {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// No motion demanded.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns true if neither component demands any motion.
    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}
