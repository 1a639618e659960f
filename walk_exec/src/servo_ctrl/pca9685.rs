//! [`ServoDriver`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::i2c::{Write, WriteRead};
use pwm_pca9685::{Address, Channel, Pca9685};

use super::{ServoDriver, ServoError, PWM_RESOLUTION};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prescale giving a 50 Hz PWM frequency from the 25 MHz internal oscillator.
const PRESCALE_50HZ: u8 = 121;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create and enable a PCA9685 on the default address, running at 50 Hz for hobby servos.
pub fn init<I2C, E>(i2c: I2C) -> Result<Pca9685<I2C>, ServoError>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    let mut pwm = Pca9685::new(i2c, Address::default()).map_err(|_| ServoError::I2c)?;

    pwm.set_prescale(PRESCALE_50HZ).map_err(|_| ServoError::I2c)?;
    pwm.enable().map_err(|_| ServoError::I2c)?;

    Ok(pwm)
}

/// Map a channel number onto the driver's channel type.
fn to_channel(channel: u8) -> Option<Channel> {
    let c = match channel {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };

    Some(c)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    fn set_duty_cycle(&mut self, channel: u8, duty_cycle: f64) -> Result<(), ServoError> {
        // If the duty cycle is out of range return an error
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ServoError::InvalidDutyCycle(duty_cycle));
        }

        let ch = match to_channel(channel) {
            Some(c) => c,
            None => return Err(ServoError::UnknownChannel(channel)),
        };

        // The counter tops out at 4095
        let off = ((duty_cycle * PWM_RESOLUTION) as u16).min(4095);

        match self.set_channel_on_off(ch, 0, off) {
            Ok(_) => Ok(()),
            Err(pwm_pca9685::Error::I2C(_)) => Err(ServoError::I2c),
            Err(pwm_pca9685::Error::InvalidInputData) => Err(ServoError::InvalidDutyCycle(duty_cycle)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channel_map() {
        assert_eq!(to_channel(0), Some(Channel::C0));
        assert_eq!(to_channel(15), Some(Channel::C15));
        assert_eq!(to_channel(16), None);
    }
}
