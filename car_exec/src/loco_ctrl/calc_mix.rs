//! Differential drive mixing

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{WheelCmd, WheelDems};

use super::{LocoCtrlParams, MotionCommand, StatusReport};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Mix a motion command into wheel demands.
///
/// Linear and angular parts are scaled and truncated to whole duty counts separately, then
/// superposed with the angular part added to the right wheel and taken from the left. Each wheel
/// is then saturated at `DUTY_MAX`, which is recorded in the report.
pub fn mix(params: &LocoCtrlParams, cmd: MotionCommand) -> (WheelDems, StatusReport) {
    // Casting to an integer truncates towards zero and saturates at the limits of i64
    let lin = (params.full_speed_duty * cmd.linear) as i64;
    let turn = (params.turn_duty * cmd.angular) as i64;

    let (left, left_limited) = WheelCmd::from_signed(lin.saturating_sub(turn));
    let (right, right_limited) = WheelCmd::from_signed(lin.saturating_add(turn));

    (
        WheelDems { left, right },
        StatusReport {
            left_duty_limited: left_limited,
            right_duty_limited: right_limited,
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::{Direction, DUTY_MAX};

    fn params() -> LocoCtrlParams {
        LocoCtrlParams::default()
    }

    #[test]
    fn test_zero_is_stopped() {
        let (dems, report) = mix(&params(), MotionCommand::zero());
        assert!(dems.is_stopped());
        assert!(!report.left_duty_limited && !report.right_duty_limited);
    }

    #[test]
    fn test_straight() {
        let (dems, _) = mix(&params(), MotionCommand::new(1.0, 0.0));
        assert_eq!(dems.left, dems.right);
        assert_eq!(dems.left.direction, Direction::Forward);
        assert_eq!(dems.left.duty, 50_000);

        let (dems, _) = mix(&params(), MotionCommand::new(-0.5, 0.0));
        assert_eq!(dems.right.direction, Direction::Reverse);
        assert_eq!(dems.right.duty, 25_000);
    }

    #[test]
    fn test_spin() {
        let (dems, _) = mix(&params(), MotionCommand::new(0.0, 1.0));
        assert_eq!(dems.left.direction, Direction::Reverse);
        assert_eq!(dems.right.direction, Direction::Forward);
        assert_eq!(dems.left.duty, 20_000);
        assert_eq!(dems.right.duty, 20_000);
    }

    #[test]
    fn test_truncation() {
        // 50000 * 0.33333 = 16666.5 and 20000 * 0.00001 = 0.2, both truncated
        let (dems, _) = mix(&params(), MotionCommand::new(0.33333, 0.00001));
        assert_eq!(dems.left.signed(), 16_666);
        assert_eq!(dems.right.signed(), 16_666);

        let (dems, _) = mix(&params(), MotionCommand::new(-0.33333, 0.0));
        assert_eq!(dems.left.signed(), -16_666);
    }

    #[test]
    fn test_saturation() {
        // Autonomous steering can exceed unit angular demand
        let (dems, report) = mix(&params(), MotionCommand::new(1.0, 5.0));
        assert_eq!(dems.right.duty, DUTY_MAX);
        assert_eq!(dems.right.direction, Direction::Forward);
        assert!(report.right_duty_limited);

        assert_eq!(dems.left.signed(), 50_000 - 100_000);
        assert!(!report.left_duty_limited);

        let (dems, report) = mix(&params(), MotionCommand::new(-1.0, 2.0));
        assert_eq!(dems.left.signed(), -(DUTY_MAX as i64));
        assert!(report.left_duty_limited);
        assert_eq!(dems.right.signed(), -10_000);
    }

    #[test]
    fn test_mirrored() {
        let (a, _) = mix(&params(), MotionCommand::new(0.4, 0.7));
        let (b, _) = mix(&params(), MotionCommand::new(0.4, -0.7));
        assert_eq!(a.left, b.right);
        assert_eq!(a.right, b.left);
    }
}
