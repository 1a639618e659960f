//! Head moves

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{Body, BodyError};
use crate::head::Head;
use crate::motion::MotionBatch;
use crate::servo_ctrl::JointActuator;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Body<A> {
    /// Tilt the head to `angle_deg`, 90 looking straight ahead.
    pub fn set_head(&mut self, angle_deg: f64) -> Result<(), BodyError> {
        let mut batch = MotionBatch::new(self.params.max_servo_iteration, self.speed);
        self.head.append_angle(angle_deg, &mut batch);

        batch.exec(&mut self.actuator)?;
        self.head.record(angle_deg);

        debug!("Head at {:.1}", angle_deg);

        Ok(())
    }

    /// Tilt the head to one of its named positions.
    pub fn set_named_head(&mut self, name: &str) -> Result<(), BodyError> {
        match self.head.named_position(name) {
            Some(angle) => self.set_head(angle),
            None => Err(BodyError::UnknownHeadPosition(name.to_string())),
        }
    }

    pub fn head(&self) -> &Head {
        &self.head
    }
}
