//! Goal geometry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::wrap_pi;

use super::Waypoint;
use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Where a waypoint lies relative to the car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBearing {
    /// Straight line distance to the waypoint.
    ///
    /// Units: meters
    pub range_m: f64,

    /// Angle from the car's heading to the waypoint, positive to the left, in `(-pi, pi]`.
    ///
    /// Units: radians
    pub bearing_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the range and bearing from the car to a waypoint.
///
/// A waypoint on top of the car has zero range and a bearing of minus the (wrapped) heading.
pub fn range_bearing(pose: &Pose, target: &Waypoint) -> RangeBearing {
    let diff = target.position_m() - pose.position_m;

    RangeBearing {
        range_m: diff.norm(),
        bearing_rad: wrap_pi(diff[1].atan2(diff[0]) - pose.heading_rad),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

    fn rb(pose: Pose, x: f64, y: f64) -> RangeBearing {
        range_bearing(&pose, &Waypoint::new(x, y))
    }

    #[test]
    fn test_dead_ahead() {
        let r = rb(Pose::default(), 1.0, 0.0);
        assert_eq!(r.range_m, 1.0);
        assert_eq!(r.bearing_rad, 0.0);
    }

    #[test]
    fn test_left_and_right() {
        let r = rb(Pose::default(), 0.0, 2.0);
        assert!((r.range_m - 2.0).abs() < 1e-12);
        assert!((r.bearing_rad - FRAC_PI_2).abs() < 1e-12);

        let r = rb(Pose::new(1.0, 1.0, 0.0), 2.0, 0.0);
        assert!((r.range_m - 2f64.sqrt()).abs() < 1e-12);
        assert!((r.bearing_rad + FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_behind() {
        let r = rb(Pose::default(), -1.0, 0.0);
        assert!((r.bearing_rad - PI).abs() < 1e-12);
    }

    #[test]
    fn test_accumulated_heading() {
        // Three and a quarter turns anticlockwise, car is facing +Y
        let r = rb(Pose::new(0.0, 0.0, 3.0 * TAU + FRAC_PI_2), 1.0, 0.0);
        assert!((r.bearing_rad + FRAC_PI_2).abs() < 1e-9);

        let r = rb(Pose::new(0.0, 0.0, -5.0 * TAU), 0.0, 1.0);
        assert!((r.bearing_rad - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_always_in_range() {
        let mut heading = -50.0;
        while heading < 50.0 {
            let r = rb(Pose::new(0.3, -0.2, heading), -1.0, 0.7);
            assert!(r.bearing_rad > -PI && r.bearing_rad <= PI);
            heading += 0.37;
        }
    }

    #[test]
    fn test_coincident() {
        let r = rb(Pose::new(1.0, 1.0, 0.5), 1.0, 1.0);
        assert_eq!(r.range_m, 0.0);
        assert!((r.bearing_rad + 0.5).abs() < 1e-12);
    }
}
