//! # Equipment Module
//!
//! This module provides the interfaces between the control software and the drivetrain hardware.
//! Everything above this module only sees the [`MotorDriver`] and [`Encoder`] traits, so the same
//! controller runs on the real H-bridge or on the simulated drivetrain.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`MotorDriver`] implementation for an L298N dual H-bridge behind `embedded-hal` pins.
pub mod l298n;

/// Simulated drivetrain, implements both [`MotorDriver`] and [`Encoder`].
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{Direction, EncoderSample, WheelId};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for the wheel motor drivers.
pub trait MotorDriver {
    /// Set the drive direction of a wheel.
    fn set_direction(&mut self, wheel: WheelId, direction: Direction)
        -> Result<(), MotorDriverError>;

    /// Set the PWM duty of a wheel.
    ///
    /// ## Arguments
    /// - `wheel` - The wheel to set the duty for
    /// - `duty` - Duty in the range `[0, DUTY_MAX]`, larger values are rejected
    fn set_duty(&mut self, wheel: WheelId, duty: u16) -> Result<(), MotorDriverError>;
}

/// Trait to read the accumulated wheel encoder counts.
pub trait Encoder {
    /// Read both counters, or `None` if they could not be read this cycle.
    fn read(&mut self) -> Option<EncoderSample>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MotorDriverError {
    #[error("Could not set the direction pins of the {0:?} wheel")]
    Pin(WheelId),

    #[error("Duty {1} for the {0:?} wheel is above the maximum")]
    InvalidDuty(WheelId, u16),

    #[error("The motor driver is not available")]
    Unavailable,
}
