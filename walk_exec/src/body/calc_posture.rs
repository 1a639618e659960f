//! Postures, body height, spread and stretch

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};

use super::{Body, BodyError};
use crate::geometry::{equal, Point, Transform};
use crate::servo_ctrl::JointActuator;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Body<A> {
    /// Move every leg to a named posture in one motion.
    ///
    /// The posture becomes the legs' rest positions (plus any spread and stretch) and the
    /// attitude is reset.
    pub fn set_named_posture(&mut self, name: &str) -> Result<(), BodyError> {
        let posture = match self.postures.get(name) {
            Some(p) => p.clone(),
            None => return Err(BodyError::UnknownPosture(name.to_string())),
        };

        let mut baselines = Vec::with_capacity(self.legs.len());
        let mut moves = Vec::with_capacity(self.legs.len());

        for (i, leg) in self.legs.iter().enumerate() {
            let baseline = match posture.toe_target(leg.which()) {
                Some(p) => p,
                None => {
                    warn!(
                        "Posture '{}' has no entry for leg {}, keeping its rest position",
                        name,
                        leg.which()
                    );
                    self.baselines[i]
                }
            };

            let rest = baseline + self.rest_offset(i, self.spread, self.stretch);
            moves.push((i, leg.plan_goto(rest)?));
            baselines.push(baseline);
        }

        self.exec_moves(&moves)?;

        for (i, (_, mv)) in moves.iter().enumerate() {
            self.legs[i].set_rest_position(mv.target);
        }
        self.baselines = baselines;
        self.attitude = Transform::identity();
        self.posture = Some(name.to_string());
        self.height = self.mean_rest_height();

        info!("Posture set to '{}', height {:.2}", name, self.height);

        Ok(())
    }

    /// Raise or lower the body to `height` above the toes, without lifting any leg.
    pub fn set_body_height(&mut self, height: f64) -> Result<(), BodyError> {
        if equal(height, self.height) {
            return Ok(());
        }

        let delta = Point::new(0.0, 0.0, -(height - self.height));

        let mut moves = Vec::with_capacity(self.legs.len());
        for (i, leg) in self.legs.iter().enumerate() {
            moves.push((i, leg.plan_move_by(delta)?));
        }

        self.exec_moves(&moves)?;

        for i in 0..self.legs.len() {
            self.baselines[i] += delta;
            let rest = self.legs[i].rest_position() + delta;
            self.legs[i].set_rest_position(rest);
        }
        self.height = height;

        info!("Body height set to {:.2}", height);

        Ok(())
    }

    /// Move every toe `spread` outward from its posture position.
    pub fn set_spread(&mut self, spread: f64) -> Result<(), BodyError> {
        self.rehome(spread, self.stretch)?;
        self.spread = spread;
        Ok(())
    }

    /// Move every toe `stretch` away from the centre of the body along its length.
    pub fn set_stretch(&mut self, stretch: f64) -> Result<(), BodyError> {
        self.rehome(self.spread, stretch)?;
        self.stretch = stretch;
        Ok(())
    }

    /// Move each leg by the change in its rest offset for a new spread and stretch.
    fn rehome(&mut self, spread: f64, stretch: f64) -> Result<(), BodyError> {
        let mut moves = Vec::with_capacity(self.legs.len());

        for (i, leg) in self.legs.iter().enumerate() {
            let delta = self.rest_offset(i, spread, stretch)
                - self.rest_offset(i, self.spread, self.stretch);
            moves.push((i, leg.plan_move_by(delta)?));
        }

        self.exec_moves(&moves)?;

        for i in 0..self.legs.len() {
            let rest = self.baselines[i] + self.rest_offset(i, spread, stretch);
            self.legs[i].set_rest_position(rest);
        }

        Ok(())
    }

    fn mean_rest_height(&self) -> f64 {
        let total: f64 = self.legs.iter().map(|l| -l.rest_position().z()).sum();
        total / self.legs.len() as f64
    }
}
