//! # Drivetrain Equipment Demands and Sensor Data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest duty value that will ever be sent to a motor driver.
///
/// The top of the 16 bit range is kept back as a margin, drivers never see a fully saturated
/// PWM output.
pub const DUTY_MAX: u16 = 65_530;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demand for a single wheel motor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelCmd {
    /// Direction the H-bridge is set to drive the wheel.
    pub direction: Direction,

    /// PWM duty on the enable line, in the range `[0, DUTY_MAX]`.
    pub duty: u16,
}

/// Demands for both wheels of the car for one cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelDems {
    pub left: WheelCmd,
    pub right: WheelCmd,
}

/// Accumulated encoder counts for both wheels.
///
/// Counters are raw hardware values, they increase when the wheel drives forwards and may wrap
/// around at the limits of `i32`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderSample {
    pub left_ticks: i32,
    pub right_ticks: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the drive wheels
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum WheelId {
    Left,
    Right,
}

/// Drive direction of a single wheel motor.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Direction {
    Forward,
    Reverse,
    /// Both bridge inputs low, the motor coasts.
    Idle,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl WheelCmd {
    /// A stopped wheel, idle direction and zero duty.
    pub const STOPPED: WheelCmd = WheelCmd {
        direction: Direction::Idle,
        duty: 0,
    };

    /// Build a wheel command from a signed demand value.
    ///
    /// The sign selects the direction and the magnitude, saturated at [`DUTY_MAX`], becomes the
    /// duty. Returns the command and whether the magnitude had to be limited.
    pub fn from_signed(value: i64) -> (Self, bool) {
        let direction = match value {
            v if v > 0 => Direction::Forward,
            v if v < 0 => Direction::Reverse,
            _ => Direction::Idle,
        };

        let magnitude = value.unsigned_abs();
        let limited = magnitude > DUTY_MAX as u64;

        let duty = if limited { DUTY_MAX } else { magnitude as u16 };

        (Self { direction, duty }, limited)
    }

    /// Get the signed value of this command, positive for forwards.
    pub fn signed(&self) -> i64 {
        match self.direction {
            Direction::Forward => self.duty as i64,
            Direction::Reverse => -(self.duty as i64),
            Direction::Idle => 0,
        }
    }
}

impl WheelDems {
    /// Both wheels stopped.
    pub const STOPPED: WheelDems = WheelDems {
        left: WheelCmd::STOPPED,
        right: WheelCmd::STOPPED,
    };

    /// Get the command for the given wheel.
    pub fn get(&self, wheel: WheelId) -> WheelCmd {
        match wheel {
            WheelId::Left => self.left,
            WheelId::Right => self.right,
        }
    }

    /// Returns true if both wheels are idle with zero duty.
    pub fn is_stopped(&self) -> bool {
        *self == Self::STOPPED
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Idle
    }
}

impl EncoderSample {
    pub fn new(left_ticks: i32, right_ticks: i32) -> Self {
        Self {
            left_ticks,
            right_ticks,
        }
    }

    /// Tick deltas `(left, right)` from a previous sample to this one.
    ///
    /// Subtraction wraps, so a counter rolling over between the two samples still yields the
    /// small signed step the wheel actually made.
    pub fn delta_since(&self, prev: &EncoderSample) -> (i32, i32) {
        (
            self.left_ticks.wrapping_sub(prev.left_ticks),
            self.right_ticks.wrapping_sub(prev.right_ticks),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wheel_cmd_from_signed() {
        assert_eq!(WheelCmd::from_signed(0), (WheelCmd::STOPPED, false));

        let (cmd, limited) = WheelCmd::from_signed(50_000);
        assert_eq!(cmd.direction, Direction::Forward);
        assert_eq!(cmd.duty, 50_000);
        assert!(!limited);

        let (cmd, limited) = WheelCmd::from_signed(-70_000);
        assert_eq!(cmd.direction, Direction::Reverse);
        assert_eq!(cmd.duty, DUTY_MAX);
        assert!(limited);
        assert_eq!(cmd.signed(), -(DUTY_MAX as i64));
    }

    #[test]
    fn test_encoder_delta_wraps() {
        let prev = EncoderSample::new(i32::MAX - 2, 10);
        let now = EncoderSample::new(i32::MIN + 3, 4);
        assert_eq!(now.delta_since(&prev), (6, -6));
    }
}
