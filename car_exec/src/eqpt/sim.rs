//! # Simulated drivetrain
//!
//! A kinematic stand-in for the motors and encoders. Each wheel turns at a rate proportional to
//! its duty, and the encoder counters integrate that rate over one control cycle every time they
//! are read. There is no inertia, slip or deadband.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use serde::Deserialize;

use comms_if::eqpt::{Direction, EncoderSample, WheelCmd, WheelDems, WheelId, DUTY_MAX};
use util::maths::lin_map;

use super::{Encoder, MotorDriver, MotorDriverError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimParams {
    /// Wheel speed at full (65535) duty.
    ///
    /// Units: encoder ticks/second
    pub max_wheel_speed_ticks_s: f64,

    /// Time simulated by each encoder read.
    ///
    /// Units: seconds
    pub step_s: f64,
}

/// Handle to a simulated drivetrain.
///
/// Clones share the same drivetrain, so one clone can be handed to locomotion control as the
/// motor driver while another is read as the encoder.
#[derive(Clone)]
pub struct SimDrivetrain {
    inner: Rc<RefCell<SimState>>,
}

struct SimState {
    params: SimParams,
    dems: WheelDems,
    left_ticks: f64,
    right_ticks: f64,
    encoders_available: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_wheel_speed_ticks_s: 1232.0,
            step_s: 0.1,
        }
    }
}

impl SimDrivetrain {
    pub fn new(params: SimParams) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SimState {
                params,
                dems: WheelDems::STOPPED,
                left_ticks: 0.0,
                right_ticks: 0.0,
                encoders_available: true,
            })),
        }
    }

    /// The demands currently applied to the motors.
    pub fn dems(&self) -> WheelDems {
        self.inner.borrow().dems
    }

    /// Make the encoder readings fail (or succeed again). The wheels keep turning either way.
    pub fn set_encoders_available(&self, available: bool) {
        self.inner.borrow_mut().encoders_available = available;
    }
}

impl SimState {
    fn wheel_mut(&mut self, wheel: WheelId) -> &mut WheelCmd {
        match wheel {
            WheelId::Left => &mut self.dems.left,
            WheelId::Right => &mut self.dems.right,
        }
    }

    fn wheel_speed_ticks_s(&self, cmd: WheelCmd) -> f64 {
        let speed = lin_map(
            (0.0, u16::MAX as f64),
            (0.0, self.params.max_wheel_speed_ticks_s),
            cmd.duty as f64,
        );

        match cmd.direction {
            Direction::Forward => speed,
            Direction::Reverse => -speed,
            Direction::Idle => 0.0,
        }
    }

    fn step(&mut self) {
        let dt = self.params.step_s;
        self.left_ticks += self.wheel_speed_ticks_s(self.dems.left) * dt;
        self.right_ticks += self.wheel_speed_ticks_s(self.dems.right) * dt;
    }
}

impl MotorDriver for SimDrivetrain {
    fn set_direction(
        &mut self,
        wheel: WheelId,
        direction: Direction,
    ) -> Result<(), MotorDriverError> {
        self.inner.borrow_mut().wheel_mut(wheel).direction = direction;
        Ok(())
    }

    fn set_duty(&mut self, wheel: WheelId, duty: u16) -> Result<(), MotorDriverError> {
        if duty > DUTY_MAX {
            return Err(MotorDriverError::InvalidDuty(wheel, duty));
        }

        self.inner.borrow_mut().wheel_mut(wheel).duty = duty;
        Ok(())
    }
}

impl Encoder for SimDrivetrain {
    fn read(&mut self) -> Option<EncoderSample> {
        let mut state = self.inner.borrow_mut();
        state.step();

        if state.encoders_available {
            Some(EncoderSample::new(
                state.left_ticks.round() as i32,
                state.right_ticks.round() as i32,
            ))
        } else {
            None
        }
    }
}
