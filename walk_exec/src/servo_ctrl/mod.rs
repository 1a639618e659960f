//! # Servo Controller Module
//!
//! This module provides a unified servo control interface which can abstract over different types
//! of servo driver boards. Servos are addressed by their channel number on the driver board and
//! commanded in logical degrees, with 90 degrees being the neutral pose of every joint.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// Simulated [`ServoDriver`] which records the duty cycles it is given.
pub mod sim;

/// Saving and loading the per-channel calibration offsets.
mod calibration;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use serde::Deserialize;
use std::collections::BTreeMap;

pub use sim::SimDriver;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The angle every servo is assumed to sit at when enrolled.
pub const NEUTRAL_ANGLE_DEG: f64 = 90.0;

/// Resolution of the PWM counter.
pub const PWM_RESOLUTION: f64 = 4096.0;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
pub trait ServoDriver {
    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(&mut self, channel: u8, duty_cycle: f64) -> Result<(), ServoError>;
}

/// Something which can move joints by channel, as consumed by a
/// [`crate::motion::MotionBatch`].
pub trait JointActuator {
    /// True if a joint is enrolled on the channel.
    fn has_channel(&self, channel: u8) -> bool;

    /// The last commanded angle of the channel, `None` if it isn't enrolled.
    fn get_angle(&self, channel: u8) -> Option<f64>;

    /// Command the channel to the given angle.
    fn set_angle(&mut self, channel: u8, angle_deg: f64) -> Result<(), ServoError>;

    /// Enroll a joint on a channel. `reversed` joints are mounted mirrored.
    fn enroll(&mut self, name: &str, channel: u8, reversed: bool);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Servo parameters shared by every servo on the controller.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServoParams {
    /// Minimum logical angle a servo can be commanded to
    pub min_angle_deg: f64,

    /// Maximum logical angle a servo can be commanded to
    pub max_angle_deg: f64,

    /// PWM count out of 4096 which corresponds to 0 degrees
    pub low_count: f64,

    /// PWM count out of 4096 which corresponds to 180 degrees
    pub high_count: f64,
}

/// A single enrolled servo.
#[derive(Clone, Debug, PartialEq)]
pub struct Servo {
    pub name: String,
    pub channel: u8,

    /// If true the servo is mounted mirrored and is driven to `180 - angle`
    pub reversed: bool,

    /// Last commanded logical angle
    pub position: f64,

    /// Additive offset applied before the angle is sent to the driver
    pub calibration: f64,
}

/// The servo controller, owning a driver and the servos enrolled on it.
pub struct ServoCtrl<D>
where
    D: ServoDriver,
{
    driver: D,

    params: ServoParams,

    servos: BTreeMap<u8, Servo>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0, found {0}")]
    InvalidDutyCycle(f64),

    #[error("No servo is enrolled on channel {0}")]
    UnknownChannel(u8),

    #[error("Could not access the calibration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not (de)serialise the calibration: {0}")]
    Json(#[from] serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ServoParams {
    fn default() -> Self {
        Self {
            min_angle_deg: 18.0,
            max_angle_deg: 162.0,
            low_count: 102.0,
            high_count: 512.0,
        }
    }
}

impl Servo {
    fn new(name: &str, channel: u8, reversed: bool) -> Self {
        Self {
            name: name.to_string(),
            channel,
            reversed,
            position: NEUTRAL_ANGLE_DEG,
            calibration: 0.0,
        }
    }
}

impl<D> ServoCtrl<D>
where
    D: ServoDriver,
{
    /// Create a new servo controller with no servos enrolled.
    ///
    /// ## Arguments
    /// - `driver` - An initialised [`ServoDriver`] board
    /// - `params` - Parameters for the servos managed by this controller
    pub fn new(driver: D, params: ServoParams) -> Self {
        Self {
            driver,
            params,
            servos: BTreeMap::new(),
        }
    }

    pub fn get(&self, channel: u8) -> Option<&Servo> {
        self.servos.get(&channel)
    }

    /// Iterate over every enrolled servo in channel order.
    pub fn servos(&self) -> impl Iterator<Item = &Servo> {
        self.servos.values()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Set the calibration offset of a channel, enrolling it if needed.
    pub fn set_calibration(&mut self, channel: u8, offset_deg: f64) {
        self.servos
            .entry(channel)
            .or_insert_with(|| Servo::new("", channel, false))
            .calibration = offset_deg;
    }

    /// Compute the duty cycle sent to the driver for a logical angle.
    fn duty_cycle(&self, servo: &Servo, angle_deg: f64) -> f64 {
        let physical = if servo.reversed {
            180.0 - angle_deg
        }
        else {
            angle_deg
        };

        let count = util::maths::lin_map(
            (0.0, 180.0),
            (self.params.low_count, self.params.high_count),
            physical + servo.calibration,
        );

        util::maths::clamp(count / PWM_RESOLUTION, 0.0, 1.0)
    }
}

impl<D> JointActuator for ServoCtrl<D>
where
    D: ServoDriver,
{
    fn has_channel(&self, channel: u8) -> bool {
        self.servos.contains_key(&channel)
    }

    fn get_angle(&self, channel: u8) -> Option<f64> {
        self.servos.get(&channel).map(|s| s.position)
    }

    fn set_angle(&mut self, channel: u8, angle_deg: f64) -> Result<(), ServoError> {
        let angle = util::maths::clamp(
            angle_deg,
            self.params.min_angle_deg,
            self.params.max_angle_deg,
        );

        let duty = match self.servos.get(&channel) {
            Some(s) => self.duty_cycle(s, angle),
            None => return Err(ServoError::UnknownChannel(channel)),
        };

        trace!("Servo {} to {:.2} deg (duty {:.4})", channel, angle, duty);

        self.driver.set_duty_cycle(channel, duty)?;

        if let Some(s) = self.servos.get_mut(&channel) {
            s.position = angle;
        }

        Ok(())
    }

    /// Enroll a servo on a channel.
    ///
    /// If the channel is already enrolled the existing servo is kept. Channels which only have a
    /// loaded calibration take on the name and mirroring given here.
    fn enroll(&mut self, name: &str, channel: u8, reversed: bool) {
        let servo = self
            .servos
            .entry(channel)
            .or_insert_with(|| Servo::new("", channel, reversed));

        if servo.name.is_empty() {
            debug!(
                "Enrolled servo {} on channel {}{}",
                name,
                channel,
                if reversed { " (reversed)" } else { "" }
            );
            servo.name = name.to_string();
            servo.reversed = reversed;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctrl() -> ServoCtrl<SimDriver> {
        ServoCtrl::new(SimDriver::default(), ServoParams::default())
    }

    #[test]
    fn test_enroll_starts_neutral() {
        let mut sc = ctrl();
        sc.enroll("fl_cox", 4, false);

        assert!(sc.has_channel(4));
        assert!(!sc.has_channel(5));
        assert_eq!(sc.get_angle(4), Some(NEUTRAL_ANGLE_DEG));

        // Re-enrolling keeps the original servo
        sc.enroll("other", 4, true);
        let s = sc.get(4).unwrap();
        assert_eq!(s.name, "fl_cox");
        assert!(!s.reversed);
    }

    #[test]
    fn test_set_angle_clamps_and_maps() {
        let mut sc = ctrl();
        sc.enroll("a", 1, false);
        sc.enroll("b", 2, true);

        sc.set_angle(1, 0.0).unwrap();
        assert_eq!(sc.get_angle(1), Some(18.0));

        sc.set_angle(1, 90.0).unwrap();
        let expected = (102.0 + 0.5 * (512.0 - 102.0)) / 4096.0;
        assert!((sc.driver().duty(1).unwrap() - expected).abs() < 1e-12);

        // A reversed servo at 60 is physically at 120
        sc.set_angle(2, 60.0).unwrap();
        assert_eq!(sc.get_angle(2), Some(60.0));
        let expected = (102.0 + (120.0 / 180.0) * (512.0 - 102.0)) / 4096.0;
        assert!((sc.driver().duty(2).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_channel() {
        let mut sc = ctrl();
        assert!(matches!(
            sc.set_angle(7, 90.0),
            Err(ServoError::UnknownChannel(7))
        ));
        assert_eq!(sc.get_angle(7), None);
    }

    #[test]
    fn test_calibration_offsets_duty() {
        let mut sc = ctrl();
        sc.enroll("a", 1, false);
        sc.set_calibration(1, 10.0);

        sc.set_angle(1, 80.0).unwrap();

        // Logical position unaffected, physical output as if at 90
        assert_eq!(sc.get_angle(1), Some(80.0));
        let expected = (102.0 + 0.5 * (512.0 - 102.0)) / 4096.0;
        assert!((sc.driver().duty(1).unwrap() - expected).abs() < 1e-12);
    }
}
