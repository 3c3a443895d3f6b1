//! # Car Executable Parameters
//!
//! This module provides parameters for the car executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::eqpt::sim::SimParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CarExecParams {
    /// Period of the control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles a manual command stays in force without a new request, `0` to hold it
    /// forever.
    pub manual_timeout_cycles: u64,

    /// Waypoint file, relative to the software root.
    pub waypoint_file: String,

    /// Simulated drivetrain.
    pub sim: SimParams,
}

#[derive(Debug, Error)]
pub enum CarExecParamsError {
    #[error("The cycle period must be a positive number of seconds, found {0}")]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for CarExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.1,
            manual_timeout_cycles: 10,
            waypoint_file: String::from("data/waypoints.txt"),
            sim: SimParams::default(),
        }
    }
}

impl CarExecParams {
    /// The control cycle period, if it is positive and representable.
    pub fn cycle_period(&self) -> Result<Duration, CarExecParamsError> {
        if !(self.cycle_period_s > 0.0) {
            return Err(CarExecParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        Duration::try_from_secs_f64(self.cycle_period_s)
            .map_err(|_| CarExecParamsError::InvalidCyclePeriod(self.cycle_period_s))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: CarExecParams = util::params::parse(
            "cycle_period_s = 0.05\n\
             manual_timeout_cycles = 0\n\
             waypoint_file = \"wp.txt\"\n\
             [sim]\n\
             max_wheel_speed_ticks_s = 1000.0\n\
             step_s = 0.05\n",
        )
        .unwrap();

        assert_eq!(params.cycle_period_s, 0.05);
        assert_eq!(params.manual_timeout_cycles, 0);
        assert_eq!(params.sim.max_wheel_speed_ticks_s, 1000.0);
        assert_eq!(params.cycle_period().unwrap(), Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_cycle_period() {
        for period_s in [0.0, -0.1, f64::NAN, f64::INFINITY, 1e30].iter() {
            let params = CarExecParams {
                cycle_period_s: *period_s,
                ..CarExecParams::default()
            };
            assert!(matches!(
                params.cycle_period(),
                Err(CarExecParamsError::InvalidCyclePeriod(_))
            ));
        }
    }
}
