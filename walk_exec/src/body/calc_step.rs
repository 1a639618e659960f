//! Taking a single gait step
//!
//! One step lifts the legs of the current gait group through the four step phases while the
//! remaining legs creep backwards, so that over a full gait cycle every leg returns to where it
//! started relative to the body and the body has moved forward one stride per step.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, error, warn};

use super::{Body, BodyError};
use crate::geometry::Transform;
use crate::leg::StepPhase;
use crate::pause::{PauseAction, PauseHook};
use crate::servo_ctrl::JointActuator;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Where the lifted legs step to.
#[derive(Clone, Copy, Debug)]
enum StepTarget<'a> {
    /// Move the toes by the stride, with the support legs creeping to compensate.
    Stride(&'a Transform),

    /// Plant the toes back on their home positions, without moving the support legs.
    Home,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Body<A> {
    /// Take one step of the current gait, moving the body by `stride`.
    ///
    /// If the pause hook cancels, the step is still completed (no leg is left in the air) and
    /// `CancelledByOperator` is returned.
    pub fn step<P: PauseHook>(
        &mut self,
        stride: &Transform,
        height: f64,
        pause: &mut P,
    ) -> Result<(), BodyError> {
        self.take_step(StepTarget::Stride(stride), height, pause)
    }

    /// Take one step of the current gait which plants the lifted legs on their rest positions.
    pub fn settle_step<P: PauseHook>(&mut self, height: f64, pause: &mut P) -> Result<(), BodyError> {
        self.take_step(StepTarget::Home, height, pause)
    }

    /// Take a full gait cycle of settling steps, leaving every leg at rest.
    pub fn settle<P: PauseHook>(&mut self, pause: &mut P) -> Result<(), BodyError> {
        for _ in 0..self.step_count()? {
            self.settle_step(self.step_height, pause)?;
        }

        Ok(())
    }

    /// Number of steps in a full cycle of the current gait.
    pub fn step_count(&self) -> Result<usize, BodyError> {
        self.gaits
            .get(&self.cur_gait)
            .map(|g| g.step_count())
            .ok_or_else(|| BodyError::UnknownGait(self.cur_gait.clone()))
    }

    fn take_step<P: PauseHook>(
        &mut self,
        target: StepTarget,
        height: f64,
        pause: &mut P,
    ) -> Result<(), BodyError> {
        let (lift, steps_per_cycle) = match self.gaits.get(&self.cur_gait) {
            Some(g) => (g.group(self.cursor).to_vec(), g.step_count()),
            None => return Err(BodyError::UnknownGait(self.cur_gait.clone())),
        };

        let mut lift_idx = Vec::with_capacity(lift.len());
        for which in &lift {
            lift_idx.push(self.leg_index(which)?);
        }
        let support_idx: Vec<usize> = (0..self.legs.len())
            .filter(|i| !lift_idx.contains(i))
            .collect();

        // The support legs' share of the stride, taken in two parts during each step they
        // support. Over a cycle the creeps undo one stride so every leg comes back to its start.
        let (stride, unstride) = match target {
            StepTarget::Stride(s) if steps_per_cycle > 1 => {
                (*s, s.inverse().fraction((steps_per_cycle - 1) * 2))
            }
            StepTarget::Stride(s) => (*s, Transform::identity()),
            StepTarget::Home => (Transform::identity(), Transform::identity()),
        };

        debug!(
            "Starting step {} at {}, lifting {:?}, stride {} unstride {}",
            self.steps_taken, self.position, lift, stride, unstride
        );

        for &i in &lift_idx {
            match target {
                StepTarget::Stride(s) => {
                    let step = self.legs[i].stride_vector(s);
                    self.legs[i].start_step(step, height);
                }
                StepTarget::Home => {
                    let home = self.home_position(i);
                    self.legs[i].start_step_to(home, height);
                }
            }
        }

        let result = self.run_phases(&lift_idx, &support_idx, &unstride, pause);

        if let Err(e) = &result {
            warn!("Step failed ({}), putting the lifted legs back down", e);
            if let Err(e) = self.abort_step(&lift_idx) {
                error!("Could not put the lifted legs back down: {}", e);
            }
        }

        for leg in self.legs.iter_mut() {
            let p = leg.end_step();
            debug!("Leg {} toe at {}", leg.which(), p);
        }

        let cancelled = result?;

        self.cursor.advance(steps_per_cycle);
        self.position += stride.translation();
        self.steps_taken += 1;

        debug!("Step complete, body at {}", self.position);

        if cancelled {
            warn!("Walk cancelled by the operator");
            return Err(BodyError::CancelledByOperator);
        }

        Ok(())
    }

    /// Run the four phases of a step. Returns true if the operator cancelled.
    fn run_phases<P: PauseHook>(
        &mut self,
        lift: &[usize],
        support: &[usize],
        unstride: &Transform,
        pause: &mut P,
    ) -> Result<bool, BodyError> {
        let mut cancelled = false;

        for phase in StepPhase::ALL.iter() {
            let mut moves = Vec::with_capacity(self.legs.len());

            for &i in lift {
                moves.push((i, self.legs[i].plan_step(*phase)?));
            }

            if let StepPhase::Lift | StepPhase::Drop = phase {
                for &i in support {
                    let delta = self.legs[i].stride_vector(unstride);
                    moves.push((i, self.legs[i].plan_move_by(delta)?));
                }
            }

            self.exec_moves(&moves)?;

            // Once cancelled the remaining phases run without pausing, planting the legs
            if !cancelled && pause.pause(&format!("{:?}", phase)) == PauseAction::Cancel {
                cancelled = true;
            }
        }

        Ok(cancelled)
    }

    /// Return the lifted legs of an interrupted step to the ground where they started.
    fn abort_step(&mut self, lift: &[usize]) -> Result<(), BodyError> {
        let mut moves = Vec::with_capacity(lift.len());
        for &i in lift {
            if let Some(mv) = self.legs[i].plan_abort_step()? {
                moves.push((i, mv));
            }
        }

        self.exec_moves(&moves)
    }
}
