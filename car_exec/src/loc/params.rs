//! Parameters structure for the odometer

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drivetrain geometry used by the odometer.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct LocParams {
    /// Distance between the contact points of the two drive wheels.
    ///
    /// Units: meters
    pub track_width_m: f64,

    /// Circumference of a drive wheel.
    ///
    /// Units: meters
    pub wheel_circ_m: f64,

    /// Encoder ticks per full revolution of a drive wheel.
    pub ticks_per_rev: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LocParams {
    /// Distance travelled by a wheel per encoder tick, in meters.
    pub fn meters_per_tick(&self) -> f64 {
        self.wheel_circ_m / self.ticks_per_rev as f64
    }
}

impl Default for LocParams {
    fn default() -> Self {
        Self {
            track_width_m: 0.1778,
            wheel_circ_m: 0.214,
            ticks_per_rev: 2464,
        }
    }
}
