//! # Leg
//!
//! A single leg: its geometry, its commanded toe position and the four phase
//! state machine used to take one step.
//!
//! The leg's `position` is the *commanded* toe position. Servos give no
//! position feedback, so a successful `goto` records the new position as
//! soon as the angles are queued, before the servos physically move. At the
//! end of a step [`Leg::end_step`] re-derives the position from the angles
//! actually commanded, which keeps small numeric drift from accumulating.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod frame;
mod kinematics;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use log::trace;
use serde::Deserialize;

use crate::geometry::{Point, Transform};
use crate::motion::MotionBatch;

pub use frame::Frame;
pub use kinematics::{LegKind, LinkLengths, Unreachable};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint angles of a leg in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LegAngles {
    pub cox: f64,
    pub femur: f64,
    pub tibia: f64,
}

/// Servo channels driving a leg's joints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ServoIds {
    pub cox: u8,
    pub femur: u8,
    pub tibia: u8,
}

/// A planned, not yet committed, move of a single leg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegMove {
    /// Toe target in the leg's local frame
    pub target: Point,

    /// Joint angles reaching the target
    pub angles: LegAngles,

    /// The step phase this move completes, if it is part of a step
    pub phase: Option<StepPhase>,
}

/// A single leg.
#[derive(Clone, Debug)]
pub struct Leg {
    number: usize,
    which: String,
    kind: LegKind,
    frame: Frame,
    links: LinkLengths,
    servo_ids: ServoIds,
    clear_height: f64,

    position: Point,
    rest_position: Point,
    angles: LegAngles,

    step: Option<StepState>,
}

/// State of an in-progress step.
#[derive(Clone, Copy, Debug)]
struct StepState {
    start: Point,
    dest: Point,
    height: f64,
    last_phase: Option<StepPhase>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The phases of a single step, always run in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// Raise the toe straight up off the ground.
    Clear,

    /// Swing to the apex, half way to the destination.
    Lift,

    /// Arrive above the destination, still clear of the ground.
    Drop,

    /// Plant the toe on the destination.
    Pose,
}

/// A leg joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Joint {
    Cox,
    Femur,
    Tibia,
}

/// Errors which can occur while moving a leg.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LegError {
    #[error(
        "Leg {leg} cannot reach {target}: distance {distance:.3} exceeds its reach of {reach:.3}"
    )]
    UnreachablePosition {
        leg: String,
        target: Point,
        distance: f64,
        reach: f64,
    },

    #[error("Leg {0} has no step in progress")]
    StepNotStarted(String),

    #[error("Leg {leg} expected step phase {expected:?} but was asked for {requested:?}")]
    PhaseOutOfOrder {
        leg: String,
        expected: StepPhase,
        requested: StepPhase,
    },

    #[error("Unknown joint \"{0}\", expected cox, femur or tibia")]
    UnknownJoint(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StepPhase {
    /// Every phase, in execution order.
    pub const ALL: [StepPhase; 4] = [
        StepPhase::Clear,
        StepPhase::Lift,
        StepPhase::Drop,
        StepPhase::Pose,
    ];

    /// The phase which must follow `prev` (`None` for a freshly started step).
    fn after(prev: Option<StepPhase>) -> Option<StepPhase> {
        match prev {
            None => Some(StepPhase::Clear),
            Some(StepPhase::Clear) => Some(StepPhase::Lift),
            Some(StepPhase::Lift) => Some(StepPhase::Drop),
            Some(StepPhase::Drop) => Some(StepPhase::Pose),
            Some(StepPhase::Pose) => None,
        }
    }
}

impl FromStr for Joint {
    type Err = LegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cox" | "c" => Ok(Joint::Cox),
            "femur" | "f" => Ok(Joint::Femur),
            "tibia" | "t" => Ok(Joint::Tibia),
            _ => Err(LegError::UnknownJoint(s.to_string())),
        }
    }
}

impl LegAngles {
    pub fn get(&self, joint: Joint) -> f64 {
        match joint {
            Joint::Cox => self.cox,
            Joint::Femur => self.femur,
            Joint::Tibia => self.tibia,
        }
    }

    pub fn set(&mut self, joint: Joint, angle: f64) {
        match joint {
            Joint::Cox => self.cox = angle,
            Joint::Femur => self.femur = angle,
            Joint::Tibia => self.tibia = angle,
        }
    }
}

impl Neg for LegAngles {
    type Output = LegAngles;

    fn neg(self) -> LegAngles {
        LegAngles {
            cox: -self.cox,
            femur: -self.femur,
            tibia: -self.tibia,
        }
    }
}

impl fmt::Display for LegAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(cox={:.1} femur={:.1} tibia={:.1})",
            self.cox, self.femur, self.tibia
        )
    }
}

impl ServoIds {
    pub fn channel(&self, joint: Joint) -> u8 {
        match joint {
            Joint::Cox => self.cox,
            Joint::Femur => self.femur,
            Joint::Tibia => self.tibia,
        }
    }
}

impl Leg {
    /// Create a new leg mounted at `location` in the body frame.
    ///
    /// The joints are assumed to start at the servos' neutral 90 degrees, so
    /// the initial position is the toe position for that pose.
    pub fn new(
        number: usize,
        which: &str,
        location: Point,
        links: LinkLengths,
        servo_ids: ServoIds,
        clear_height: f64,
    ) -> Self {
        let kind = LegKind::Quad;
        let angles = LegAngles {
            cox: 90.0,
            femur: 90.0,
            tibia: 90.0,
        };
        let position = kind.forward(&links, &angles);

        Self {
            number,
            which: which.to_string(),
            kind,
            frame: Frame::for_mount(location),
            links,
            servo_ids,
            clear_height,
            position,
            rest_position: position,
            angles,
            step: None,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn which(&self) -> &str {
        &self.which
    }

    pub fn kind(&self) -> LegKind {
        self.kind
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The hip mount point in the body frame.
    pub fn location(&self) -> Point {
        self.frame.origin()
    }

    pub fn links(&self) -> &LinkLengths {
        &self.links
    }

    pub fn servo_ids(&self) -> &ServoIds {
        &self.servo_ids
    }

    /// True for legs on the mirrored (right hand) side of the body.
    pub fn is_mirrored(&self) -> bool {
        self.frame.is_mirrored()
    }

    /// The commanded toe position in the leg's local frame.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rest_position(&self) -> Point {
        self.rest_position
    }

    pub fn set_rest_position(&mut self, rest: Point) {
        self.rest_position = rest;
    }

    /// The most recently commanded joint angles.
    pub fn angles(&self) -> LegAngles {
        self.angles
    }

    /// True while a step is in progress.
    pub fn is_stepping(&self) -> bool {
        self.step.is_some()
    }

    /// The commanded toe position in the body frame.
    pub fn global_position(&self) -> Point {
        self.frame.to_global(&self.position)
    }

    /// Convert a body frame position into this leg's local frame.
    pub fn from_global_position(&self, global: &Point) -> Point {
        self.frame.to_local(global)
    }

    pub fn inverse_kinematics(&self, toe: &Point) -> Result<LegAngles, LegError> {
        self.kind
            .inverse(&self.links, toe)
            .map_err(|u| LegError::UnreachablePosition {
                leg: self.which.clone(),
                target: *toe,
                distance: u.distance,
                reach: u.reach,
            })
    }

    pub fn forward_kinematics(&self, angles: &LegAngles) -> Point {
        self.kind.forward(&self.links, angles)
    }

    /// The local displacement of this leg's toe when the body frame is
    /// moved by `stride`.
    pub fn stride_vector(&self, stride: &Transform) -> Point {
        let moved = self.global_position().apply(stride);
        self.from_global_position(&moved) - self.position
    }

    /// Plan a move of the toe to `target` without changing the leg.
    pub fn plan_goto(&self, target: Point) -> Result<LegMove, LegError> {
        let angles = self.inverse_kinematics(&target)?;

        Ok(LegMove {
            target,
            angles,
            phase: None,
        })
    }

    /// Plan a move of the toe by `delta` (leg local frame).
    pub fn plan_move_by(&self, delta: Point) -> Result<LegMove, LegError> {
        self.plan_goto(self.position + delta)
    }

    /// Plan a move which sets a single joint, leaving the others unchanged.
    pub fn plan_joint(&self, joint: Joint, angle: f64) -> LegMove {
        let mut angles = self.angles;
        angles.set(joint, angle);

        LegMove {
            target: self.forward_kinematics(&angles),
            angles,
            phase: None,
        }
    }

    /// Queue the angles of a planned move into `batch` and record the new
    /// commanded position.
    pub fn commit(&mut self, mv: &LegMove, batch: &mut MotionBatch) {
        self.append_angles(&mv.angles, batch);
        self.record(mv);
    }

    /// Queue the angles of a planned move into `batch` without updating the
    /// leg. Use [`Leg::record`] once the batch has executed.
    pub fn append_angles(&self, angles: &LegAngles, batch: &mut MotionBatch) {
        batch.append(self.servo_ids.cox, angles.cox);
        batch.append(self.servo_ids.femur, angles.femur);
        batch.append(self.servo_ids.tibia, angles.tibia);
    }

    /// Record a planned move as the leg's commanded state.
    pub fn record(&mut self, mv: &LegMove) {
        trace!("Leg {} to {} {}", self.which, mv.target, mv.angles);

        self.position = mv.target;
        self.angles = mv.angles;

        if let (Some(phase), Some(step)) = (mv.phase, self.step.as_mut()) {
            step.last_phase = Some(phase);
        }
    }

    /// Move the toe to `target`, queueing the joint angles into `batch`.
    pub fn goto(&mut self, target: Point, batch: &mut MotionBatch) -> Result<(), LegError> {
        let mv = self.plan_goto(target)?;
        self.commit(&mv, batch);
        Ok(())
    }

    /// Move the toe by `delta` in a single continuous motion, without lifting.
    pub fn move_by(&mut self, delta: Point, batch: &mut MotionBatch) -> Result<(), LegError> {
        self.goto(self.position + delta, batch)
    }

    /// Begin a step of `step` (leg local frame) with a swing apex `height`
    /// above the ground.
    pub fn start_step(&mut self, step: Point, height: f64) {
        self.step = Some(StepState {
            start: self.position,
            dest: self.position + step,
            height,
            last_phase: None,
        });
    }

    /// Begin a step which ends on `dest`.
    pub fn start_step_to(&mut self, dest: Point, height: f64) {
        let step = dest - self.position;
        self.start_step(step, height);
    }

    /// The destination of the step in progress.
    pub fn step_dest(&self) -> Option<Point> {
        self.step.map(|s| s.dest)
    }

    /// Plan the given phase of the step in progress.
    pub fn plan_step(&self, phase: StepPhase) -> Result<LegMove, LegError> {
        let step = match self.step {
            Some(s) => s,
            None => return Err(LegError::StepNotStarted(self.which.clone())),
        };

        match StepPhase::after(step.last_phase) {
            Some(expected) if expected == phase => (),
            Some(expected) => {
                return Err(LegError::PhaseOutOfOrder {
                    leg: self.which.clone(),
                    expected,
                    requested: phase,
                })
            }
            None => return Err(LegError::StepNotStarted(self.which.clone())),
        }

        let clear = Point::new(0.0, 0.0, self.clear_height);

        let target = match phase {
            StepPhase::Clear => step.start + clear,
            StepPhase::Lift => {
                let mid = step.start.midpoint(&step.dest);
                mid.with_z(mid.z() + step.height)
            }
            StepPhase::Drop => step.dest + clear,
            StepPhase::Pose => step.dest,
        };

        let mut mv = self.plan_goto(target)?;
        mv.phase = Some(phase);

        Ok(mv)
    }

    /// Run one phase of the step in progress, queueing into `batch`.
    pub fn step(&mut self, phase: StepPhase, batch: &mut MotionBatch) -> Result<(), LegError> {
        let mv = self.plan_step(phase)?;
        self.commit(&mv, batch);
        Ok(())
    }

    /// Plan the move which puts the toe back down on the start of an interrupted step.
    ///
    /// `None` if no step is in progress, or if the toe never left or is already back on the
    /// ground.
    pub fn plan_abort_step(&self) -> Result<Option<LegMove>, LegError> {
        match self.step {
            Some(StepState {
                start,
                last_phase: Some(phase),
                ..
            }) if phase != StepPhase::Pose => self.plan_goto(start).map(Some),
            _ => Ok(None),
        }
    }

    /// Finish the step (if any), re-deriving the position from the commanded
    /// angles. Returns the new position.
    pub fn end_step(&mut self) -> Point {
        self.step = None;
        self.position = self.forward_kinematics(&self.angles);
        self.position
    }

    /// Human readable summary of the leg's state.
    pub fn show_position(&self) -> String {
        format!(
            "leg {} position {} global {} rest {} angles {}",
            self.which,
            self.position,
            self.global_position(),
            self.rest_position,
            self.angles
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_leg(y: f64) -> Leg {
        Leg::new(
            0,
            "fl",
            Point::new(5.3, y, 0.0),
            LinkLengths {
                femur: 5.3,
                tibia: 6.0,
            },
            ServoIds {
                cox: 4,
                femur: 3,
                tibia: 2,
            },
            0.5,
        )
    }

    #[test]
    fn test_goto_updates_position_and_batch() {
        let mut leg = test_leg(5.0);
        let mut batch = MotionBatch::new(5.0, 0.0);

        let target = Point::new(2.0, -1.0, -7.0);
        leg.goto(target, &mut batch).unwrap();

        assert_eq!(leg.position(), target);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(3), Some(leg.angles().femur));
        assert!(leg.forward_kinematics(&leg.angles()).approx_eq(&target, 1e-6));
    }

    #[test]
    fn test_goto_unreachable_leaves_leg_untouched() {
        let mut leg = test_leg(5.0);
        let mut batch = MotionBatch::new(5.0, 0.0);
        let before = leg.position();

        let e = leg.goto(Point::new(0.0, 0.0, -20.0), &mut batch).unwrap_err();

        assert!(matches!(e, LegError::UnreachablePosition { .. }));
        assert_eq!(leg.position(), before);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_step_phases() {
        let mut leg = test_leg(5.0);
        let mut batch = MotionBatch::new(5.0, 0.0);
        let start = Point::new(2.0, -1.0, -7.0);
        leg.goto(start, &mut batch).unwrap();

        leg.start_step(Point::new(3.0, 0.0, 0.0), 3.0);
        let dest = start + Point::new(3.0, 0.0, 0.0);
        assert_eq!(leg.step_dest(), Some(dest));

        leg.step(StepPhase::Clear, &mut batch).unwrap();
        assert_eq!(leg.position(), Point::new(2.0, -1.0, -6.5));

        leg.step(StepPhase::Lift, &mut batch).unwrap();
        assert_eq!(leg.position(), Point::new(3.5, -1.0, -4.0));

        leg.step(StepPhase::Drop, &mut batch).unwrap();
        assert_eq!(leg.position(), Point::new(5.0, -1.0, -6.5));

        leg.step(StepPhase::Pose, &mut batch).unwrap();
        assert_eq!(leg.position(), dest);

        let end = leg.end_step();
        assert!(end.approx_eq(&dest, 1e-6));
        assert!(!leg.is_stepping());
    }

    #[test]
    fn test_step_phase_order_enforced() {
        let mut leg = test_leg(5.0);
        let mut batch = MotionBatch::new(5.0, 0.0);

        assert_eq!(
            leg.step(StepPhase::Clear, &mut batch),
            Err(LegError::StepNotStarted("fl".to_string()))
        );

        leg.start_step(Point::default(), 1.0);
        assert_eq!(
            leg.step(StepPhase::Lift, &mut batch),
            Err(LegError::PhaseOutOfOrder {
                leg: "fl".to_string(),
                expected: StepPhase::Clear,
                requested: StepPhase::Lift,
            })
        );

        for phase in StepPhase::ALL.iter() {
            leg.step(*phase, &mut batch).unwrap();
        }

        // A completed step can't be continued
        assert!(leg.step(StepPhase::Clear, &mut batch).is_err());
    }

    #[test]
    fn test_abort_step() {
        let mut leg = test_leg(5.0);
        let mut batch = MotionBatch::new(5.0, 0.0);
        let start = leg.position();

        leg.start_step(Point::new(1.0, 0.0, 0.0), 2.0);
        assert_eq!(leg.plan_abort_step(), Ok(None));

        leg.step(StepPhase::Clear, &mut batch).unwrap();
        leg.step(StepPhase::Lift, &mut batch).unwrap();
        assert!(leg.position().z() > start.z());

        let mv = leg.plan_abort_step().unwrap().unwrap();
        assert_eq!(mv.target, start);
        assert_eq!(mv.phase, None);

        leg.record(&mv);
        assert!(leg.end_step().approx_eq(&start, 1e-6));
        assert_eq!(leg.plan_abort_step(), Ok(None));
    }

    #[test]
    fn test_stride_vector_is_mirrored() {
        let left = test_leg(5.0);
        let right = test_leg(-5.0);

        let stride = Transform::from_translation(Point::new(1.0, 0.5, 0.0));

        assert!(left
            .stride_vector(&stride)
            .approx_eq(&Point::new(1.0, 0.5, 0.0), 1e-9));
        assert!(right
            .stride_vector(&stride)
            .approx_eq(&Point::new(1.0, -0.5, 0.0), 1e-9));
    }

    #[test]
    fn test_plan_joint() {
        let leg = test_leg(5.0);
        let mv = leg.plan_joint(Joint::Femur, 100.0);

        assert_eq!(mv.angles.femur, 100.0);
        assert_eq!(mv.angles.cox, leg.angles().cox);
        assert!(leg.inverse_kinematics(&mv.target).is_ok());
        assert_eq!("tibia".parse::<Joint>(), Ok(Joint::Tibia));
        assert_eq!(
            "knee".parse::<Joint>(),
            Err(LegError::UnknownJoint("knee".to_string()))
        );
    }

    #[test]
    fn test_angles_neg() {
        let mut a = LegAngles::default();
        a.set(Joint::Cox, 10.0);
        a.set(Joint::Tibia, -20.0);

        assert_eq!(
            -a,
            LegAngles {
                cox: -10.0,
                femur: 0.0,
                tibia: 20.0
            }
        );
    }
}
