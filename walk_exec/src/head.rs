//! # Head
//!
//! The head carries the robot's sensor on a single servo which tilts it, 90 degrees looking
//! straight ahead, 0 up and 180 down. A body may also have no head servo at all, in which case
//! head moves are only recorded.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use log::trace;
use serde::Deserialize;

use crate::motion::MotionBatch;
use crate::servo_ctrl::{JointActuator, NEUTRAL_ANGLE_DEG};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name the head servo is enrolled under.
pub const HEAD_JOINT_NAME: &str = "head_0";

/// Named position the head takes at start up.
pub const DEFAULT_HEAD_POSITION: &str = "default";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the head.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeadParams {
    pub kind: HeadKind,

    /// Servo channel tilting the head
    pub servo: u8,

    /// Named head angles in degrees
    pub positions: BTreeMap<String, f64>,
}

/// The head.
#[derive(Clone, Debug)]
pub struct Head {
    kind: HeadKind,
    servo: u8,
    position: f64,
    positions: BTreeMap<String, f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeadKind {
    /// No head servo is fitted
    None,

    /// A single tilt servo
    Simple,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HeadParams {
    fn default() -> Self {
        let mut positions = BTreeMap::new();
        positions.insert(DEFAULT_HEAD_POSITION.to_string(), 90.0);
        positions.insert("up".to_string(), 0.0);
        positions.insert("down".to_string(), 180.0);

        Self {
            kind: HeadKind::Simple,
            servo: 15,
            positions,
        }
    }
}

impl Head {
    pub fn new(params: &HeadParams) -> Self {
        Self {
            kind: params.kind,
            servo: params.servo,
            position: NEUTRAL_ANGLE_DEG,
            positions: params.positions.clone(),
        }
    }

    /// Enroll the head servo on the actuator, if there is one.
    pub fn enroll<A: JointActuator>(&self, actuator: &mut A) {
        if self.kind == HeadKind::Simple {
            actuator.enroll(HEAD_JOINT_NAME, self.servo, false);
        }
    }

    /// Queue the head's servo move to `angle` into `batch`. Use [`Head::record`] once the batch
    /// has executed.
    pub fn append_angle(&self, angle: f64, batch: &mut MotionBatch) {
        if self.kind == HeadKind::Simple {
            batch.append(self.servo, angle);
        }
    }

    pub fn record(&mut self, angle: f64) {
        trace!("Head to {:.1}", angle);
        self.position = angle;
    }

    pub fn kind(&self) -> HeadKind {
        self.kind
    }

    /// The last commanded head angle.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn named_position(&self, name: &str) -> Option<f64> {
        self.positions.get(name).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::{ServoCtrl, ServoParams, SimDriver};

    #[test]
    fn test_simple_head_moves_servo() {
        let mut sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        let mut head = Head::new(&HeadParams::default());
        head.enroll(&mut sc);

        assert_eq!(sc.get(15).unwrap().name, HEAD_JOINT_NAME);

        let mut batch = MotionBatch::new(5.0, 0.0);
        head.append_angle(45.0, &mut batch);
        assert_eq!(batch.get(15), Some(45.0));

        batch.exec(&mut sc).unwrap();
        head.record(45.0);

        assert_eq!(sc.get_angle(15), Some(45.0));
        assert_eq!(head.position(), 45.0);
    }

    #[test]
    fn test_no_head_only_records() {
        let mut sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        let params = HeadParams {
            kind: HeadKind::None,
            ..HeadParams::default()
        };
        let mut head = Head::new(&params);
        head.enroll(&mut sc);

        assert!(!sc.has_channel(15));

        let mut batch = MotionBatch::new(5.0, 0.0);
        head.append_angle(120.0, &mut batch);
        assert!(batch.is_empty());

        head.record(120.0);
        assert_eq!(head.position(), 120.0);
    }

    #[test]
    fn test_named_positions() {
        let head = Head::new(&HeadParams::default());

        assert_eq!(head.named_position("default"), Some(90.0));
        assert_eq!(head.named_position("down"), Some(180.0));
        assert_eq!(head.named_position("sideways"), None);
    }

    #[test]
    fn test_params_kind_is_lowercase() {
        let params: HeadParams = util::params::from_str("kind = \"none\"\nservo = 14").unwrap();

        assert_eq!(params.kind, HeadKind::None);
        assert_eq!(params.servo, 14);
        assert_eq!(params.positions.len(), 3);
    }
}
