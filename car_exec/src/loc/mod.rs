//! # Localisation module
//!
//! This module provides localisation for the car in the form of dead-reckoning wheel odometry.
//! Every cycle the [`Odometer`] takes the accumulated encoder counts of both wheels, converts the
//! change since the last cycle into a body displacement and integrates it into the [`Pose`].
//!
//! The odometry frame is fixed at wherever the car was when the odometer was created or last
//! reset: X along the initial heading, Y to the left, heading counter-clockwise from X.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use comms_if::eqpt::EncoderSample;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::{self, Session},
};

pub use params::LocParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The pose (position and heading in the odometry frame) of the car.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the centre of the drive axle.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Heading, counter-clockwise from the X axis.
    ///
    /// Not wrapped, accumulates across full turns.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Dead-reckoning odometer.
pub struct Odometer {
    params: LocParams,

    pose: Pose,

    /// Encoder reading the next displacement is measured from.
    ///
    /// `None` until the first reading arrives, so that counts accumulated before startup are not
    /// integrated as motion.
    baseline: Option<EncoderSample>,

    arch_pose: Archiver,
}

/// Archive record of the pose.
#[derive(Serialize)]
struct PoseRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    pub fn x(&self) -> f64 {
        self.position_m[0]
    }

    pub fn y(&self) -> f64 {
        self.position_m[1]
    }

    /// Unit vector along the car's heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl Odometer {
    pub fn new(params: LocParams) -> Self {
        Self {
            params,
            pose: Pose::default(),
            baseline: None,
            arch_pose: Archiver::default(),
        }
    }

    /// Start archiving the pose into the session's archive directory.
    pub fn init_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_pose = Archiver::from_path(session, "loc/pose.csv")?;
        Ok(())
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Integrate the displacement since the previous reading.
    ///
    /// If the encoders could not be read (`None`) the pose is left unchanged and the baseline is
    /// kept, so the motion is picked up in full by the next successful reading.
    pub fn update(&mut self, sample: Option<EncoderSample>) -> Pose {
        let sample = match sample {
            Some(s) => s,
            None => {
                debug!("No encoder reading this cycle, pose held");
                return self.pose;
            }
        };

        let prev = match self.baseline.replace(sample) {
            Some(p) => p,
            None => {
                debug!("Encoder baseline set to {:?}", sample);
                return self.pose;
            }
        };

        let (dl_ticks, dr_ticks) = sample.delta_since(&prev);
        let m_per_tick = self.params.meters_per_tick();
        let dl_m = dl_ticks as f64 * m_per_tick;
        let dr_m = dr_ticks as f64 * m_per_tick;

        let dist_m = (dl_m + dr_m) / 2.0;
        let dheading_rad = (dr_m - dl_m) / self.params.track_width_m;

        // Displacement is applied along the heading at the start of the step
        self.pose.position_m += self.pose.forward() * dist_m;
        self.pose.heading_rad += dheading_rad;

        trace!(
            "Pose: ({:.3}, {:.3}) m, {:.3} rad",
            self.pose.x(),
            self.pose.y(),
            self.pose.heading_rad
        );

        self.pose
    }

    /// Reset the pose to the origin and take `sample` as the new baseline.
    ///
    /// The next displacement is measured from `sample`, so counts accumulated before the reset do
    /// not leak into the new frame.
    pub fn reset(&mut self, sample: Option<EncoderSample>) {
        self.pose = Pose::default();
        self.baseline = sample;
        debug!("Odometer reset, baseline {:?}", sample);
    }
}

impl Archived for Odometer {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_pose.serialise(PoseRecord {
            time_s: session::get_elapsed_seconds(),
            x_m: self.pose.x(),
            y_m: self.pose.y(),
            heading_rad: self.pose.heading_rad,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn odom() -> Odometer {
        let mut odom = Odometer::new(LocParams::default());
        odom.update(Some(EncoderSample::new(1000, -500)));
        odom
    }

    #[test]
    fn test_first_sample_is_baseline() {
        let mut odom = Odometer::new(LocParams::default());
        assert_eq!(odom.update(Some(EncoderSample::new(12_345, 678))), Pose::default());
        assert_eq!(odom.update(None), Pose::default());
    }

    #[test]
    fn test_zero_delta() {
        let mut odom = odom();
        for _ in 0..10 {
            assert_eq!(odom.update(Some(EncoderSample::new(1000, -500))), Pose::default());
        }
    }

    #[test]
    fn test_straight_roll() {
        let mut odom = odom();
        let params = LocParams::default();

        // One full wheel revolution on both sides
        let pose = odom.update(Some(EncoderSample::new(1000 + 2464, -500 + 2464)));
        assert!((pose.x() - params.wheel_circ_m).abs() < 1e-12);
        assert!(pose.y().abs() < 1e-12);
        assert_eq!(pose.heading_rad, 0.0);

        // Same again backwards brings us home
        let pose = odom.update(Some(EncoderSample::new(1000, -500)));
        assert!(pose.x().abs() < 1e-12);
    }

    #[test]
    fn test_turn_in_place() {
        let mut odom = odom();
        let params = LocParams::default();

        // Right wheel forwards, left backwards, each by a quarter of the track circumference
        let arc_m = PI * params.track_width_m / 4.0;
        let ticks = (arc_m / params.meters_per_tick()).round() as i32;
        let pose = odom.update(Some(EncoderSample::new(1000 - ticks, -500 + ticks)));

        assert!(pose.position_m.norm() < 1e-12);
        assert!((pose.heading_rad - PI / 2.0).abs() < 1e-3);

        // Heading integrates beyond a full turn without wrapping
        let mut left = 1000 - ticks;
        let mut right = -500 + ticks;
        for _ in 0..7 {
            left -= ticks;
            right += ticks;
            odom.update(Some(EncoderSample::new(left, right)));
        }
        assert!((odom.pose().heading_rad - 4.0 * PI).abs() < 1e-2);
    }

    #[test]
    fn test_moves_along_heading() {
        let mut odom = odom();
        let params = LocParams::default();
        let ticks = (PI * params.track_width_m / 4.0 / params.meters_per_tick()).round() as i32;

        // Turn to face +Y, then drive 100 ticks forwards
        odom.update(Some(EncoderSample::new(1000 - ticks, -500 + ticks)));
        let pose = odom.update(Some(EncoderSample::new(1100 - ticks, -400 + ticks)));

        let dist_m = 100.0 * params.meters_per_tick();
        assert!(pose.x().abs() < 1e-4);
        assert!((pose.y() - dist_m).abs() < 1e-4);
    }

    #[test]
    fn test_encoder_wrap() {
        let mut odom = Odometer::new(LocParams::default());
        odom.update(Some(EncoderSample::new(i32::MAX - 10, i32::MAX - 10)));
        let pose = odom.update(Some(EncoderSample::new(i32::MIN + 9, i32::MIN + 9)));

        assert!((pose.x() - 20.0 * LocParams::default().meters_per_tick()).abs() < 1e-12);
    }

    #[test]
    fn test_missed_reading_catches_up() {
        let mut odom = odom();
        assert_eq!(odom.update(None), Pose::default());
        let pose = odom.update(Some(EncoderSample::new(1200, -300)));

        assert!((pose.x() - 200.0 * LocParams::default().meters_per_tick()).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut odom = odom();
        odom.update(Some(EncoderSample::new(3000, 1500)));
        assert!(odom.pose().x() > 0.0);

        odom.reset(Some(EncoderSample::new(3000, 1500)));
        assert_eq!(odom.pose(), Pose::default());

        // Only motion after the reset counts
        let pose = odom.update(Some(EncoderSample::new(3010, 1510)));
        assert!((pose.x() - 10.0 * LocParams::default().meters_per_tick()).abs() < 1e-12);

        // Reset without a reading re-baselines on the next one
        odom.reset(None);
        assert_eq!(odom.update(Some(EncoderSample::new(9000, 9000))), Pose::default());
    }
}
