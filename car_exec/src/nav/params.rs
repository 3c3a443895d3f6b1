//! Parameters structure for navigation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct NavParams {
    /// Bearing within which the car is considered to be facing the waypoint.
    ///
    /// Units: radians
    pub angle_tol_rad: f64,

    /// Range at which a waypoint is considered reached.
    ///
    /// Units: meters
    pub approach_dist_m: f64,

    /// Proportional gain from bearing to angular demand while approaching.
    ///
    /// Units: 1/radians
    pub steer_gain: f64,

    /// Linear demand while approaching a waypoint.
    pub cruise_speed: f64,

    /// Magnitude of the angular demand while turning on the spot.
    pub turn_speed: f64,

    /// Number of cycles the last manual command keeps being driven after the gamepad returns to
    /// zero.
    pub manual_hold_cycles: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        Self {
            angle_tol_rad: 0.035,
            approach_dist_m: 0.15,
            steer_gain: 5.0,
            cruise_speed: 1.0,
            turn_speed: 1.0,
            manual_hold_cycles: 5,
        }
    }
}
