//! # [`NavCtrl`] state machine

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info, warn};

use super::{range_bearing, NavParams, Waypoint};
use crate::{loc::Pose, loco_ctrl::MotionCommand};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation controller.
pub struct NavCtrl {
    params: NavParams,

    state: NavState,

    /// Waypoints still to be driven, front first.
    queue: VecDeque<Waypoint>,

    /// Autonomous state interrupted by manual override, resumed once the override ends.
    suspended: Option<NavState>,

    /// Last non-zero manual command, driven through the hold-over window.
    last_manual: MotionCommand,

    /// Hold-over cycles left before manual override ends.
    hold_remaining: u32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavState {
    Idle,
    ManualOverride,
    AcquiringWaypoint,
    Turning { target: Waypoint },
    Approaching { target: Waypoint },
}

/// What locomotion control shall do this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavOutput {
    /// Leave the current wheel demands as they are.
    None,

    /// Mix and drive this command.
    Drive(MotionCommand),

    /// Stop both wheels.
    Stop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavState {
    /// The waypoint currently being driven to, if any.
    pub fn target(&self) -> Option<Waypoint> {
        match self {
            NavState::Turning { target } | NavState::Approaching { target } => Some(*target),
            _ => None,
        }
    }

    /// Returns true if the state is part of a route.
    pub fn is_autonomous(&self) -> bool {
        matches!(
            self,
            NavState::AcquiringWaypoint | NavState::Turning { .. } | NavState::Approaching { .. }
        )
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::Idle => write!(f, "Idle"),
            NavState::ManualOverride => write!(f, "ManualOverride"),
            NavState::AcquiringWaypoint => write!(f, "AcquiringWaypoint"),
            NavState::Turning { target } => {
                write!(f, "Turning to ({:.3}, {:.3})", target.x_m, target.y_m)
            }
            NavState::Approaching { target } => {
                write!(f, "Approaching ({:.3}, {:.3})", target.x_m, target.y_m)
            }
        }
    }
}

impl NavCtrl {
    pub fn new(params: NavParams) -> Self {
        Self {
            params,
            state: NavState::Idle,
            queue: VecDeque::new(),
            suspended: None,
            last_manual: MotionCommand::zero(),
            hold_remaining: 0,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn queue(&self) -> &VecDeque<Waypoint> {
        &self.queue
    }

    /// The route state waiting for manual override to end, if any.
    pub fn suspended(&self) -> Option<NavState> {
        self.suspended
    }

    /// The waypoint being driven to, including one suspended by manual override.
    pub fn active_target(&self) -> Option<Waypoint> {
        self.state
            .target()
            .or_else(|| self.suspended.and_then(|s| s.target()))
    }

    /// Append a waypoint to the back of the queue.
    pub fn push_waypoint(&mut self, waypoint: Waypoint) {
        self.queue.push_back(waypoint);
        debug!("Waypoint queue length: {}", self.queue.len());
    }

    /// Append waypoints to the back of the queue in order.
    pub fn extend_waypoints<I: IntoIterator<Item = Waypoint>>(&mut self, waypoints: I) {
        self.queue.extend(waypoints);
        debug!("Waypoint queue length: {}", self.queue.len());
    }

    /// Start driving the waypoint queue.
    ///
    /// Only accepted from `Idle`. Returns true if the route was started.
    pub fn start_route(&mut self) -> bool {
        match self.state {
            NavState::Idle => {
                self.set_state(NavState::AcquiringWaypoint);
                true
            }
            NavState::ManualOverride => {
                warn!("Start route ignored during manual override");
                false
            }
            _ => {
                debug!("Start route ignored, already in {}", self.state);
                false
            }
        }
    }

    /// Evaluate the state machine for one cycle.
    ///
    /// A non-zero `manual` command takes priority over everything else.
    pub fn step(&mut self, pose: &Pose, manual: MotionCommand) -> NavOutput {
        if let Some(output) = self.step_manual(manual) {
            return output;
        }

        match self.state {
            NavState::Idle => NavOutput::Stop,
            // Manual override is fully handled above
            NavState::ManualOverride => NavOutput::None,
            NavState::AcquiringWaypoint => {
                match self.queue.pop_front() {
                    Some(target) => {
                        self.set_state(NavState::Turning { target });
                        NavOutput::None
                    }
                    None => {
                        info!("Route complete");
                        self.set_state(NavState::Idle);
                        NavOutput::Stop
                    }
                }
            }
            NavState::Turning { target } => {
                let rb = range_bearing(pose, &target);

                if rb.bearing_rad > self.params.angle_tol_rad {
                    NavOutput::Drive(MotionCommand::new(0.0, self.params.turn_speed))
                } else if rb.bearing_rad < -self.params.angle_tol_rad {
                    NavOutput::Drive(MotionCommand::new(0.0, -self.params.turn_speed))
                } else {
                    self.set_state(NavState::Approaching { target });
                    NavOutput::Stop
                }
            }
            NavState::Approaching { target } => {
                let rb = range_bearing(pose, &target);

                if rb.range_m > self.params.approach_dist_m {
                    NavOutput::Drive(MotionCommand::new(
                        self.params.cruise_speed,
                        self.params.steer_gain * rb.bearing_rad,
                    ))
                } else {
                    info!(
                        "Reached ({:.3}, {:.3}), {:.3} m away",
                        target.x_m, target.y_m, rb.range_m
                    );
                    self.set_state(NavState::AcquiringWaypoint);
                    NavOutput::Stop
                }
            }
        }
    }

    /// Handle manual override, returns `None` if manual override is not in control this cycle.
    fn step_manual(&mut self, manual: MotionCommand) -> Option<NavOutput> {
        if !manual.is_zero() {
            if self.state != NavState::ManualOverride {
                if self.state.is_autonomous() {
                    self.suspended = Some(self.state);
                }
                self.set_state(NavState::ManualOverride);
            }

            self.last_manual = manual;
            self.hold_remaining = self.params.manual_hold_cycles;
            return Some(NavOutput::Drive(manual));
        }

        if self.state != NavState::ManualOverride {
            return None;
        }

        if self.hold_remaining > 0 {
            self.hold_remaining -= 1;
            return Some(NavOutput::Drive(self.last_manual));
        }

        // Hold-over expired. The car has moved, so an interrupted target is re-aimed at.
        let next = match self.suspended.take() {
            Some(NavState::Turning { target }) | Some(NavState::Approaching { target }) => {
                NavState::Turning { target }
            }
            Some(s) => s,
            None => NavState::Idle,
        };
        self.last_manual = MotionCommand::zero();
        self.set_state(next);

        Some(NavOutput::Stop)
    }

    fn set_state(&mut self, new_state: NavState) {
        if new_state != self.state {
            info!("NavCtrl: {} -> {}", self.state, new_state);
            self.state = new_state;
        }
    }
}
