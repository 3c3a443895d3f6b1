//! # Robot controller
//!
//! The [`RobotController`] owns every module of the car and runs them in sequence once per
//! control cycle:
//!
//! 1. Read the encoders and update the odometry.
//! 2. Work out the manual command in force, applying the stale command timeout.
//! 3. Handle the button events received since the last cycle.
//! 4. Step navigation and apply its output through locomotion control.
//!
//! Requests are handed over with [`RobotController::handle_tc`] before calling
//! [`RobotController::cycle`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeSet;

use log::{info, warn};
use serde::Serialize;

use comms_if::{
    eqpt::{EncoderSample, WheelDems},
    tc::{ButtonEvent, Tc},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::{self, Session},
};

use crate::{
    eqpt::{Encoder, MotorDriver},
    loc::{LocParams, Odometer, Pose},
    loco_ctrl::{LocoCtrl, LocoCtrlParams, MotionCommand},
    nav::{NavCtrl, NavOutput, NavParams, NavState, Waypoint},
    wp_store::WaypointStore,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of every module owned by the controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerParams {
    pub loc: LocParams,
    pub loco_ctrl: LocoCtrlParams,
    pub nav: NavParams,

    /// Number of cycles a manual command stays in force without a new request, `0` to hold it
    /// forever.
    pub manual_timeout_cycles: u64,
}

/// Owner of the car's state and modules.
pub struct RobotController<M, E, S> {
    manual_timeout_cycles: u64,

    encoder: E,
    odom: Odometer,
    loco_ctrl: LocoCtrl<M>,
    nav: NavCtrl,
    wp_store: S,

    /// Manual command from the most recent request.
    manual_cmd: MotionCommand,

    /// Cycles since the last request was handled.
    cycles_since_tc: u64,

    /// Button events waiting for the next cycle.
    pending_events: BTreeSet<ButtonEvent>,

    /// Number of cycles already executed
    num_cycles: u128,

    arch_nav: Archiver,
}

/// Summary of one control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub pose: Pose,
    pub nav_state: NavState,
    pub dems: WheelDems,
}

/// Archive record of the navigation state.
#[derive(Serialize)]
struct NavRecord {
    time_s: f64,
    state: String,
    target_x_m: Option<f64>,
    target_y_m: Option<f64>,
    queue_len: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            loc: LocParams::default(),
            loco_ctrl: LocoCtrlParams::default(),
            nav: NavParams::default(),
            manual_timeout_cycles: 10,
        }
    }
}

impl<M, E, S> RobotController<M, E, S>
where
    M: MotorDriver,
    E: Encoder,
    S: WaypointStore,
{
    pub fn new(params: ControllerParams, driver: M, encoder: E, wp_store: S) -> Self {
        Self {
            manual_timeout_cycles: params.manual_timeout_cycles,
            encoder,
            odom: Odometer::new(params.loc),
            loco_ctrl: LocoCtrl::new(params.loco_ctrl, driver),
            nav: NavCtrl::new(params.nav),
            wp_store,
            manual_cmd: MotionCommand::zero(),
            cycles_since_tc: 0,
            pending_events: BTreeSet::new(),
            num_cycles: 0,
            arch_nav: Archiver::default(),
        }
    }

    /// Start archiving the pose, wheel demands and navigation state.
    pub fn init_archives(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.odom.init_archive(session)?;
        self.loco_ctrl.init_archive(session)?;
        self.arch_nav = Archiver::from_path(session, "nav/state.csv")?;
        Ok(())
    }

    /// Take in a request. Its manual command replaces the current one and its button events are
    /// handled on the next cycle.
    pub fn handle_tc(&mut self, tc: Tc) {
        self.manual_cmd = tc.cmd;
        self.cycles_since_tc = 0;
        self.pending_events.extend(tc.buttons);
    }

    /// Run one control cycle.
    pub fn cycle(&mut self) -> CycleReport {
        // ---- LOCALISATION ----

        let sample = self.encoder.read();
        self.odom.update(sample);

        // ---- MANUAL COMMAND ----

        let manual = self.manual_in_force();

        // ---- EVENTS ----

        for event in std::mem::take(&mut self.pending_events) {
            self.handle_event(event, sample, manual);
        }

        // ---- NAVIGATION ----

        let pose = self.odom.pose();

        match self.nav.step(&pose, manual) {
            NavOutput::None => (),
            NavOutput::Drive(cmd) => {
                self.loco_ctrl.drive(cmd);
            }
            NavOutput::Stop => self.loco_ctrl.stop(),
        }

        self.num_cycles += 1;

        CycleReport {
            pose,
            nav_state: self.nav.state(),
            dems: self.loco_ctrl.output(),
        }
    }

    /// Stop the wheels, whatever the car is doing.
    pub fn stop(&mut self) {
        self.loco_ctrl.stop();
    }

    pub fn pose(&self) -> Pose {
        self.odom.pose()
    }

    pub fn nav(&self) -> &NavCtrl {
        &self.nav
    }

    pub fn loco_ctrl(&self) -> &LocoCtrl<M> {
        &self.loco_ctrl
    }

    pub fn wp_store(&self) -> &S {
        &self.wp_store
    }

    pub fn num_cycles(&self) -> u128 {
        self.num_cycles
    }

    fn manual_in_force(&mut self) -> MotionCommand {
        self.cycles_since_tc = self.cycles_since_tc.saturating_add(1);

        if self.manual_timeout_cycles > 0
            && self.cycles_since_tc > self.manual_timeout_cycles
            && !self.manual_cmd.is_zero()
        {
            warn!(
                "No request for {} cycles, manual command {:?} dropped",
                self.manual_timeout_cycles, self.manual_cmd
            );
            self.manual_cmd = MotionCommand::zero();
        }

        self.manual_cmd
    }

    fn handle_event(
        &mut self,
        event: ButtonEvent,
        sample: Option<EncoderSample>,
        manual: MotionCommand,
    ) {
        match event {
            ButtonEvent::SaveWaypoint => {
                let waypoint = Waypoint::from(&self.odom.pose());
                info!("Waypoint saved at ({:.3}, {:.3})", waypoint.x_m, waypoint.y_m);

                self.nav.push_waypoint(waypoint);
                if let Err(e) = self.wp_store.append(waypoint) {
                    warn!("Could not store the waypoint: {}", e);
                }
            }
            ButtonEvent::LoadWaypoints => match self.wp_store.load_all() {
                Ok(waypoints) => {
                    info!("Loaded {} waypoints", waypoints.len());
                    self.nav.extend_waypoints(waypoints);
                }
                Err(e) => warn!("Could not load the waypoints: {}", e),
            },
            ButtonEvent::StartRoute => {
                // Manual takes this cycle even if navigation has not seen it yet
                if !manual.is_zero() {
                    warn!("Start route ignored during manual override");
                } else if self.nav.start_route() {
                    info!("Route started, {} waypoints queued", self.nav.queue().len());
                }
            }
            ButtonEvent::ResetPose => {
                self.odom.reset(sample);
                info!("Pose reset to the origin");

                if let Some(target) = self.nav.active_target() {
                    warn!(
                        "Target ({:.3}, {:.3}) is kept, it is now relative to the new origin",
                        target.x_m, target.y_m
                    );
                }
            }
            ButtonEvent::ClearWaypoints => match self.wp_store.clear() {
                Ok(()) => info!("Stored waypoints cleared"),
                Err(e) => warn!("Could not clear the stored waypoints: {}", e),
            },
        }
    }
}

impl<M, E, S> Archived for RobotController<M, E, S> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.odom.write()?;
        self.loco_ctrl.write()?;

        let state = self.nav.state();
        let target = state.target();
        self.arch_nav.serialise(NavRecord {
            time_s: session::get_elapsed_seconds(),
            state: state.to_string(),
            target_x_m: target.map(|t| t.x_m),
            target_y_m: target.map(|t| t.y_m),
            queue_len: self.nav.queue().len(),
        })
    }
}
