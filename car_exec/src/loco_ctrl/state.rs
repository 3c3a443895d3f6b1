//! Implementations for the LocoCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{mix, LocoCtrlParams, MotionCommand};
use crate::eqpt::{MotorDriver, MotorDriverError};
use comms_if::eqpt::{Direction, WheelDems, WheelId};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Locomotion control module state
pub struct LocoCtrl<D> {
    params: LocoCtrlParams,

    driver: D,

    /// The demands last issued to the driver.
    output: WheelDems,

    report: StatusReport,

    arch_output: Archiver,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    pub left_duty_limited: bool,
    pub right_duty_limited: bool,
}

/// Archive record of the issued demands.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    left_duty: i64,
    right_duty: i64,
    left_duty_limited: bool,
    right_duty_limited: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D: MotorDriver> LocoCtrl<D> {
    pub fn new(params: LocoCtrlParams, driver: D) -> Self {
        Self {
            params,
            driver,
            output: WheelDems::STOPPED,
            report: StatusReport::default(),
            arch_output: Archiver::default(),
        }
    }

    /// Start archiving the issued demands into the session's archive directory.
    pub fn init_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_output = Archiver::from_path(session, "loco_ctrl/output.csv")?;
        Ok(())
    }

    /// Mix the command and issue the resulting demands to the driver.
    pub fn drive(&mut self, cmd: MotionCommand) -> WheelDems {
        let (dems, report) = mix(&self.params, cmd);

        if report.left_duty_limited || report.right_duty_limited {
            trace!("Wheel duty limited: {:?}", report);
        }

        self.report = report;
        self.issue(dems);
        self.output
    }

    /// Stop both wheels: idle direction, zero duty.
    ///
    /// Does not go through the mixer and does not depend on any other module.
    pub fn stop(&mut self) {
        self.report = StatusReport::default();
        self.issue(WheelDems::STOPPED);
    }

    /// The demands last issued to the driver.
    pub fn output(&self) -> WheelDems {
        self.output
    }

    /// Status of the most recent mix.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Issue demands to the driver.
    ///
    /// Driver errors are logged and do not stop the other wheel from being commanded. The output
    /// is updated either way, it is what was demanded, not what the hardware acknowledged.
    fn issue(&mut self, dems: WheelDems) {
        for &wheel in [WheelId::Left, WheelId::Right].iter() {
            let cmd = dems.get(wheel);

            if let Err(e) = self.set_wheel(wheel, cmd.direction, cmd.duty) {
                warn!("Could not command the {:?} wheel: {}", wheel, e);
            }
        }

        self.output = dems;
    }

    fn set_wheel(
        &mut self,
        wheel: WheelId,
        direction: Direction,
        duty: u16,
    ) -> Result<(), MotorDriverError> {
        self.driver.set_direction(wheel, direction)?;
        self.driver.set_duty(wheel, duty)
    }
}

impl<D> Archived for LocoCtrl<D> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_output.serialise(OutputRecord {
            time_s: session::get_elapsed_seconds(),
            left_duty: self.output.left.signed(),
            right_duty: self.output.right.signed(),
            left_duty_limited: self.report.left_duty_limited,
            right_duty_limited: self.report.right_duty_limited,
        })
    }
}
