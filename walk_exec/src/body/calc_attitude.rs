//! Body attitude adjustment
//!
//! The attitude is a transform of the body frame relative to the toes. Changing it moves every
//! toe by the opposite of its hip's motion, so the body tilts or shifts while the toes stay
//! planted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::str::FromStr;

use log::debug;

use super::{Body, BodyError};
use crate::geometry::{Point, Transform};
use crate::servo_ctrl::JointActuator;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The adjustments which can be made to the attitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttitudeAxis {
    Forward,
    Backward,
    Left,
    Right,
    Height,

    /// Rotation about y
    Pitch,

    /// Rotation about x
    Roll,

    /// Rotation about z
    Yaw,

    /// Return to the untilted, unshifted attitude
    Normal,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AttitudeAxis {
    /// The transform adjusting the attitude by `value` along this axis.
    pub fn adjustment(&self, value: f64) -> Transform {
        match self {
            AttitudeAxis::Forward => Transform::from_translation(Point::new(value, 0.0, 0.0)),
            AttitudeAxis::Backward => Transform::from_translation(Point::new(-value, 0.0, 0.0)),
            AttitudeAxis::Left => Transform::from_translation(Point::new(0.0, value, 0.0)),
            AttitudeAxis::Right => Transform::from_translation(Point::new(0.0, -value, 0.0)),
            AttitudeAxis::Height => Transform::from_translation(Point::new(0.0, 0.0, value)),
            AttitudeAxis::Pitch => Transform::yrot(value),
            AttitudeAxis::Roll => Transform::xrot(value),
            AttitudeAxis::Yaw => Transform::zrot(value),
            AttitudeAxis::Normal => Transform::identity(),
        }
    }
}

impl FromStr for AttitudeAxis {
    type Err = BodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let axis = match s {
            "forward" => AttitudeAxis::Forward,
            "backward" => AttitudeAxis::Backward,
            "left" => AttitudeAxis::Left,
            "right" => AttitudeAxis::Right,
            "height" => AttitudeAxis::Height,
            "pitch" => AttitudeAxis::Pitch,
            "roll" => AttitudeAxis::Roll,
            "yaw" => AttitudeAxis::Yaw,
            "normal" => AttitudeAxis::Normal,
            _ => return Err(BodyError::UnknownAttitudeAxis(s.to_string())),
        };

        Ok(axis)
    }
}

impl<A: JointActuator> Body<A> {
    /// Adjust the attitude along one axis, moving every toe in one motion to keep it planted.
    ///
    /// Adjustments accumulate, `Normal` resets the attitude.
    pub fn set_attitude(&mut self, axis: AttitudeAxis, value: f64) -> Result<(), BodyError> {
        let attitude = match axis {
            AttitudeAxis::Normal => Transform::identity(),
            _ => self.attitude * axis.adjustment(value),
        };

        let mut moves = Vec::with_capacity(self.legs.len());
        for (i, leg) in self.legs.iter().enumerate() {
            let delta = self.attitude_offset(i, &attitude) - self.attitude_offset(i, &self.attitude);
            moves.push((i, leg.plan_move_by(delta)?));
        }

        self.exec_moves(&moves)?;
        self.attitude = attitude;

        debug!("Attitude now\n{}", self.attitude);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::super::state::test::test_body;
    use super::*;

    #[test]
    fn test_parse_axis() {
        assert!(matches!("pitch".parse::<AttitudeAxis>(), Ok(AttitudeAxis::Pitch)));
        assert!(matches!(
            "sideways".parse::<AttitudeAxis>(),
            Err(BodyError::UnknownAttitudeAxis(s)) if s == "sideways"
        ));
    }

    #[test]
    fn test_height_round_trip() {
        let mut body = test_body();
        let before: Vec<Point> = body.legs().iter().map(|l| l.position()).collect();

        body.set_attitude(AttitudeAxis::Height, 1.0).unwrap();
        for (leg, p) in body.legs().iter().zip(before.iter()) {
            assert!(leg.position().approx_eq(&(*p + Point::new(0.0, 0.0, -1.0)), 1e-9));
        }

        body.set_attitude(AttitudeAxis::Normal, 0.0).unwrap();
        for (leg, p) in body.legs().iter().zip(before.iter()) {
            assert!(leg.position().approx_eq(p, 1e-9));
        }
        assert!(body.attitude().approx_eq(&Transform::identity(), 1e-12));
    }

    #[test]
    fn test_roll_lowers_one_side() {
        let mut body = test_body();
        let fl = body.leg("fl").unwrap().position();
        let fr = body.leg("fr").unwrap().position();

        // Rolling right raises the left hips and lowers the right ones
        body.set_attitude(AttitudeAxis::Roll, 5.0).unwrap();
        assert!(body.leg("fl").unwrap().position().z() < fl.z());
        assert!(body.leg("fr").unwrap().position().z() > fr.z());

        // Both sides move symmetrically in their own frames
        let dl = body.leg("fl").unwrap().position() - fl;
        let dr = body.leg("fr").unwrap().position() - fr;
        assert!((dl.z() + dr.z()).abs() < 1e-9);
        assert!((dl.y() - dr.y()).abs() < 1e-9);
    }

    #[test]
    fn test_attitude_accumulates() {
        let mut body = test_body();

        body.set_attitude(AttitudeAxis::Forward, 0.5).unwrap();
        body.set_attitude(AttitudeAxis::Forward, 0.5).unwrap();
        assert_eq!(body.attitude().translation(), Point::new(1.0, 0.0, 0.0));

        body.set_attitude(AttitudeAxis::Backward, 1.0).unwrap();
        assert_eq!(body.attitude().translation(), Point::default());
    }
}
