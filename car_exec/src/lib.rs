//! # Car library.
//!
//! This library holds the control loop of the car so that the executable, and any other crate in
//! the workspace, can build and drive a [`RobotController`](controller::RobotController).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot controller - owns every module and runs one control cycle at a time
pub mod controller;

/// Equipment interfaces - motor driver and encoder traits plus their implementations
pub mod eqpt;

/// Localisation module - dead-reckoning odometry from the wheel encoders
pub mod loc;

/// Locomotion control module - mixes motion commands into wheel demands
pub mod loco_ctrl;

/// Navigation module - manual override arbitration and waypoint following
pub mod nav;

/// Executable parameters
pub mod params;

/// Telecommand sources - scripts and line based request streams
pub mod tc_source;

/// Waypoint store - persistence of saved waypoints
pub mod wp_store;
