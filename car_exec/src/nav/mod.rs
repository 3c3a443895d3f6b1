//! # Navigation module
//!
//! This module decides, every cycle, what the car should be doing. It arbitrates between manual
//! driving from the gamepad and autonomous driving through a queue of waypoints, implemented by
//! the [`NavCtrl`] state machine:
//!
//! - `Idle` - Nothing to do, the wheels are held stopped.
//! - `ManualOverride` - Manual commands are driven straight through. Entered from any state as
//!   soon as a non-zero manual command arrives.
//! - `AcquiringWaypoint` - Taking the next waypoint off the queue.
//! - `Turning` - Rotating on the spot until the waypoint is dead ahead.
//! - `Approaching` - Driving towards the waypoint with proportional steering.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod geom;
mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::loc::Pose;

pub use geom::{range_bearing, RangeBearing};
pub use params::NavParams;
pub use state::{NavCtrl, NavOutput, NavState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A target position in the odometry frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x_m: f64,
    pub y_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self { x_m, y_m }
    }

    pub fn position_m(&self) -> Vector2<f64> {
        Vector2::new(self.x_m, self.y_m)
    }
}

impl From<&Pose> for Waypoint {
    fn from(pose: &Pose) -> Self {
        Self::new(pose.x(), pose.y())
    }
}
