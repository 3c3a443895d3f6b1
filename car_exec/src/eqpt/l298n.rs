//! [`MotorDriver`] implementation for the L298N dual H-bridge
//!
//! Each wheel uses two direction inputs and one enable input. The direction inputs select the
//! bridge polarity and the enable input carries the PWM duty:
//!
//! | Direction | IN_A | IN_B |
//! |-----------|------|------|
//! | Forward   | low  | high |
//! | Reverse   | high | low  |
//! | Idle      | low  | low  |

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::{digital::v2::OutputPin, PwmPin};

use comms_if::eqpt::{Direction, WheelId, DUTY_MAX};

use super::{MotorDriver, MotorDriverError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pins of one half of the L298N.
pub struct Bridge<IN, EN> {
    pub in_a: IN,
    pub in_b: IN,
    pub en: EN,
}

/// L298N driving the left wheel from bridge A and the right wheel from bridge B.
pub struct L298n<IN, EN> {
    left: Bridge<IN, EN>,
    right: Bridge<IN, EN>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<IN, EN> L298n<IN, EN>
where
    IN: OutputPin,
    EN: PwmPin<Duty = u16>,
{
    /// Create the driver, enabling both PWM outputs at zero duty with the bridges idle.
    pub fn new(left: Bridge<IN, EN>, right: Bridge<IN, EN>) -> Result<Self, MotorDriverError> {
        let mut driver = Self { left, right };

        for wheel in [WheelId::Left, WheelId::Right].iter() {
            let bridge = driver.bridge(*wheel);
            bridge.en.set_duty(0);
            bridge.en.enable();
            driver.set_direction(*wheel, Direction::Idle)?;
        }

        Ok(driver)
    }

    /// Release the pins.
    pub fn release(self) -> (Bridge<IN, EN>, Bridge<IN, EN>) {
        (self.left, self.right)
    }

    fn bridge(&mut self, wheel: WheelId) -> &mut Bridge<IN, EN> {
        match wheel {
            WheelId::Left => &mut self.left,
            WheelId::Right => &mut self.right,
        }
    }
}

impl<IN, EN> MotorDriver for L298n<IN, EN>
where
    IN: OutputPin,
    EN: PwmPin<Duty = u16>,
{
    fn set_direction(
        &mut self,
        wheel: WheelId,
        direction: Direction,
    ) -> Result<(), MotorDriverError> {
        let bridge = self.bridge(wheel);

        let (a, b) = match direction {
            Direction::Forward => (bridge.in_a.set_low(), bridge.in_b.set_high()),
            Direction::Reverse => (bridge.in_a.set_high(), bridge.in_b.set_low()),
            Direction::Idle => (bridge.in_a.set_low(), bridge.in_b.set_low()),
        };

        a.and(b).map_err(|_| MotorDriverError::Pin(wheel))
    }

    fn set_duty(&mut self, wheel: WheelId, duty: u16) -> Result<(), MotorDriverError> {
        if duty > DUTY_MAX {
            return Err(MotorDriverError::InvalidDuty(wheel, duty));
        }

        let en = &mut self.bridge(wheel).en;

        // Scale the 16 bit duty onto the resolution of the PWM peripheral
        let max = en.get_max_duty() as u32;
        en.set_duty((duty as u32 * max / u16::MAX as u32) as u16);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Default)]
    struct MockPin {
        high: bool,
        fail: bool,
    }

    #[derive(Debug, Default)]
    struct MockPwm {
        duty: u16,
        max: u16,
        enabled: bool,
    }

    impl OutputPin for MockPin {
        type Error = ();

        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(());
            }
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(());
            }
            self.high = true;
            Ok(())
        }
    }

    impl PwmPin for MockPwm {
        type Duty = u16;

        fn disable(&mut self) {
            self.enabled = false;
        }

        fn enable(&mut self) {
            self.enabled = true;
        }

        fn get_duty(&self) -> u16 {
            self.duty
        }

        fn get_max_duty(&self) -> u16 {
            self.max
        }

        fn set_duty(&mut self, duty: u16) {
            self.duty = duty;
        }
    }

    fn bridge(max: u16) -> Bridge<MockPin, MockPwm> {
        Bridge {
            in_a: MockPin {
                high: true,
                fail: false,
            },
            in_b: MockPin {
                high: true,
                fail: false,
            },
            en: MockPwm {
                duty: 100,
                max,
                enabled: false,
            },
        }
    }

    fn levels(b: &Bridge<MockPin, MockPwm>) -> (bool, bool) {
        (b.in_a.high, b.in_b.high)
    }

    #[test]
    fn test_new_idles_bridges() {
        let driver = L298n::new(bridge(u16::MAX), bridge(u16::MAX)).unwrap();
        let (left, right) = driver.release();

        for b in [&left, &right].iter() {
            assert_eq!(levels(b), (false, false));
            assert!(b.en.enabled);
            assert_eq!(b.en.duty, 0);
        }
    }

    #[test]
    fn test_direction_truth_table() {
        let mut driver = L298n::new(bridge(u16::MAX), bridge(u16::MAX)).unwrap();

        driver.set_direction(WheelId::Left, Direction::Forward).unwrap();
        driver.set_direction(WheelId::Right, Direction::Reverse).unwrap();
        let (left, right) = driver.release();
        assert_eq!(levels(&left), (false, true));
        assert_eq!(levels(&right), (true, false));

        let mut driver = L298n::new(left, right).unwrap();
        driver.set_direction(WheelId::Right, Direction::Idle).unwrap();
        let (_, right) = driver.release();
        assert_eq!(levels(&right), (false, false));
    }

    #[test]
    fn test_duty_scaling() {
        let mut driver = L298n::new(bridge(u16::MAX), bridge(1000)).unwrap();

        driver.set_duty(WheelId::Left, 50_000).unwrap();
        driver.set_duty(WheelId::Right, 65_535 / 2).unwrap();
        assert!(matches!(
            driver.set_duty(WheelId::Left, DUTY_MAX + 1),
            Err(MotorDriverError::InvalidDuty(WheelId::Left, _))
        ));

        let (left, right) = driver.release();
        assert_eq!(left.en.duty, 50_000);
        assert_eq!(right.en.duty, 499);
    }

    #[test]
    fn test_pin_failure() {
        let mut left = bridge(u16::MAX);
        left.in_b.fail = true;
        assert!(matches!(
            L298n::new(left, bridge(u16::MAX)),
            Err(MotorDriverError::Pin(WheelId::Left))
        ));
    }
}
