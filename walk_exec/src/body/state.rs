//! Implementations for the Body state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;

// Internal
use super::{BodyError, BodyParams};
use crate::{
    gait::{Gait, GaitCursor},
    geometry::{Point, Transform},
    head::Head,
    leg::{Joint, Leg, LegMove},
    motion::MotionBatch,
    posture::Posture,
    servo_ctrl::{JointActuator, ServoCtrl, ServoDriver},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The walking body.
pub struct Body<A: JointActuator> {
    pub(crate) params: BodyParams,

    pub(crate) actuator: A,

    /// Legs in the order of their numbers
    pub(crate) legs: Vec<Leg>,

    pub(crate) head: Head,

    /// Toe position of each leg given by the current posture and height, before the spread and
    /// stretch offsets are added.
    pub(crate) baselines: Vec<Point>,

    pub(crate) gaits: BTreeMap<String, Gait>,
    pub(crate) cur_gait: String,
    pub(crate) cursor: GaitCursor,

    pub(crate) postures: BTreeMap<String, Posture>,
    pub(crate) posture: Option<String>,

    /// Accumulated distance walked in the body frame
    pub(crate) position: Point,
    pub(crate) attitude: Transform,
    pub(crate) height: f64,

    pub(crate) step_size: f64,
    pub(crate) step_height: f64,
    pub(crate) spread: f64,
    pub(crate) stretch: f64,
    pub(crate) speed: f64,

    pub(crate) steps_taken: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Body<A> {
    /// Build the body from its parameters, enrolling every joint on the actuator.
    ///
    /// All gaits and postures are parsed and checked against the legs here, so a bad
    /// specification fails at start up rather than part way through a walk.
    pub fn new(params: BodyParams, mut actuator: A) -> Result<Self, BodyError> {
        if params.legs.is_empty() {
            return Err(BodyError::NoLegs);
        }

        let mut legs = Vec::with_capacity(params.legs.len());

        for (number, (which, leg_params)) in params.legs.iter().enumerate() {
            let leg = Leg::new(
                number,
                which,
                leg_params.location(),
                leg_params.links(&params),
                leg_params.servo_ids(),
                params.clear_height,
            );

            // Mirrored legs have their servos mounted the other way round
            let ids = leg.servo_ids();
            for (joint, channel) in &[
                ("cox", ids.cox),
                ("femur", ids.femur),
                ("tibia", ids.tibia),
            ] {
                actuator.enroll(&format!("{}_{}", which, joint), *channel, leg.is_mirrored());
            }

            debug!("Added leg {} at {}", which, leg.location());
            legs.push(leg);
        }

        let head = Head::new(&params.head);
        head.enroll(&mut actuator);

        let baselines = legs.iter().map(|l| l.position()).collect();

        let mut body = Self {
            actuator,
            legs,
            head,
            baselines,
            gaits: BTreeMap::new(),
            cur_gait: params.default_gait.clone(),
            cursor: GaitCursor::default(),
            postures: BTreeMap::new(),
            posture: None,
            position: Point::default(),
            attitude: Transform::identity(),
            height: params.default_height,
            step_size: params.default_step_size,
            step_height: params.default_step_height,
            spread: 0.0,
            stretch: 0.0,
            speed: params.default_speed,
            steps_taken: 0,
            params,
        };

        for (name, spec) in body.params.gaits.clone() {
            body.add_gait(&name, &spec)?;
        }
        for (name, spec) in body.params.postures.clone() {
            body.add_posture(&name, &spec)?;
        }

        if !body.gaits.contains_key(&body.cur_gait) {
            return Err(BodyError::UnknownGait(body.cur_gait.clone()));
        }

        Ok(body)
    }

    /// Register a gait, checking it only names legs of this body.
    pub fn add_gait(&mut self, name: &str, spec: &str) -> Result<(), BodyError> {
        let gait: Gait = spec.parse()?;
        gait.validate(|leg| self.leg_index(leg).is_ok())?;

        info!("Adding gait '{}': {}", name, gait);
        self.gaits.insert(name.to_string(), gait);

        Ok(())
    }

    /// Register a posture, checking it only names legs of this body.
    pub fn add_posture(&mut self, name: &str, spec: &str) -> Result<(), BodyError> {
        let posture: Posture = spec.parse().map_err(|source| BodyError::Posture {
            name: name.to_string(),
            source,
        })?;

        for leg in posture.leg_names() {
            self.leg_index(leg)?;
        }

        info!("Adding posture '{}': {}", name, posture);
        self.postures.insert(name.to_string(), posture);

        Ok(())
    }

    /// Select the gait used by subsequent steps, starting from its first group.
    pub fn set_gait(&mut self, name: &str) -> Result<(), BodyError> {
        if !self.gaits.contains_key(name) {
            return Err(BodyError::UnknownGait(name.to_string()));
        }

        self.cur_gait = name.to_string();
        self.cursor = GaitCursor::default();

        info!("Gait set to '{}'", name);

        Ok(())
    }

    /// Move one leg's toe to an explicit position in its local frame.
    pub fn set_leg_position(&mut self, which: &str, target: Point) -> Result<(), BodyError> {
        let i = self.leg_index(which)?;
        let mv = self.legs[i].plan_goto(target)?;

        self.exec_moves(&[(i, mv)])
    }

    /// Command a single joint of a leg directly.
    pub fn set_leg_joint(&mut self, which: &str, joint: Joint, angle_deg: f64) -> Result<(), BodyError> {
        let i = self.leg_index(which)?;
        let mv = self.legs[i].plan_joint(joint, angle_deg);

        self.exec_moves(&[(i, mv)])
    }

    /// Set the interpolation speed of subsequent moves, 0 for no delays.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    pub fn set_step_height(&mut self, height: f64) {
        self.step_height = height;
    }

    // ---- ACCESSORS ----

    pub fn params(&self) -> &BodyParams {
        &self.params
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn leg(&self, which: &str) -> Result<&Leg, BodyError> {
        self.leg_index(which).map(|i| &self.legs[i])
    }

    pub fn gait(&self) -> &str {
        &self.cur_gait
    }

    pub fn posture(&self) -> Option<&str> {
        self.posture.as_deref()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn attitude(&self) -> Transform {
        self.attitude
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn stretch(&self) -> f64 {
        self.stretch
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Total number of steps taken, including settling steps.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    // ---- STATUS ----

    pub fn show_legs(&self) -> String {
        self.legs
            .iter()
            .map(|l| l.show_position())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn show_attitude(&self) -> String {
        format!("attitude:\n{}", self.attitude)
    }

    pub fn show_position(&self) -> String {
        format!(
            "position {} height {:.2} after {} steps, gait '{}', posture '{}', head {:.1}",
            self.position,
            self.height,
            self.steps_taken,
            self.cur_gait,
            self.posture.as_deref().unwrap_or("none"),
            self.head.position()
        )
    }

    // ---- INTERNAL ----

    pub(crate) fn leg_index(&self, which: &str) -> Result<usize, BodyError> {
        self.legs
            .iter()
            .position(|l| l.which() == which)
            .ok_or_else(|| BodyError::UnknownLeg(which.to_string()))
    }

    /// Execute a set of planned leg moves as one batch, recording them on the legs only once
    /// the batch has executed.
    pub(crate) fn exec_moves(&mut self, moves: &[(usize, LegMove)]) -> Result<(), BodyError> {
        let mut batch = MotionBatch::new(self.params.max_servo_iteration, self.speed);

        for (i, mv) in moves {
            self.legs[*i].append_angles(&mv.angles, &mut batch);
        }

        batch.exec(&mut self.actuator)?;

        for (i, mv) in moves {
            self.legs[*i].record(mv);
        }

        Ok(())
    }

    /// Offset of each leg's rest position from its baseline for the given spread and stretch.
    ///
    /// Stretch moves toes away from the body's centre along x, spread moves them outward.
    pub(crate) fn rest_offset(&self, i: usize, spread: f64, stretch: f64) -> Point {
        let sign = if self.legs[i].location().x() < 0.0 { -1.0 } else { 1.0 };
        Point::new(stretch * sign, spread, 0.0)
    }

    /// Local displacement of a leg's toe which keeps it planted while the body takes the given
    /// attitude.
    pub(crate) fn attitude_offset(&self, i: usize, attitude: &Transform) -> Point {
        let mount = self.legs[i].location();
        let moved = mount.apply(attitude) - mount;
        self.legs[i].frame().vector_to_local(&-moved)
    }

    /// Where a leg's toe rests given the current attitude.
    pub(crate) fn home_position(&self, i: usize) -> Point {
        self.legs[i].rest_position() + self.attitude_offset(i, &self.attitude)
    }
}

impl<D: ServoDriver> Body<ServoCtrl<D>> {
    pub fn save_calibration<P: AsRef<Path>>(&self, path: P) -> Result<(), BodyError> {
        Ok(self.actuator.save_calibration(path)?)
    }

    pub fn load_calibration<P: AsRef<Path>>(&mut self, path: P) -> Result<(), BodyError> {
        Ok(self.actuator.load_calibration(path)?)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::servo_ctrl::{ServoParams, SimDriver};

    pub(crate) type TestBody = Body<ServoCtrl<SimDriver>>;

    /// A body on the simulated driver, in the relaxed posture and running without delays.
    pub(crate) fn test_body() -> TestBody {
        let mut params = BodyParams::default();
        params.default_speed = 0.0;

        let sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        let mut body = Body::new(params, sc).unwrap();
        body.set_named_posture("relax").unwrap();

        body
    }

    #[test]
    fn test_new() {
        let body = test_body();

        assert_eq!(body.legs().len(), 4);
        assert_eq!(body.gait(), "default");
        assert_eq!(body.posture(), Some("relax"));
        assert!((body.height() - 6.0).abs() < 1e-9);

        // Right hand servos are reversed
        assert!(body.actuator().get(12).unwrap().reversed);
        assert!(!body.actuator().get(3).unwrap().reversed);
        assert_eq!(body.actuator().get(8).unwrap().name, "rr_cox");
        assert_eq!(body.actuator().get(15).unwrap().name, "head_0");
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let mut params = BodyParams::default();
        params.gaits.insert("bad".to_string(), "fl,xx".to_string());
        let sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        assert!(matches!(Body::new(params, sc), Err(BodyError::Gait(_))));

        let mut params = BodyParams::default();
        params.postures.insert("bad".to_string(), "xx:1 2 3".to_string());
        let sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        assert!(matches!(Body::new(params, sc), Err(BodyError::UnknownLeg(_))));

        let mut params = BodyParams::default();
        params.default_gait = "amble".to_string();
        let sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        assert!(matches!(Body::new(params, sc), Err(BodyError::UnknownGait(_))));
    }

    #[test]
    fn test_set_leg_position_and_joint() {
        let mut body = test_body();
        let target = Point::new(4.0, 1.0, -6.0);

        body.set_leg_position("fr", target).unwrap();
        assert_eq!(body.leg("fr").unwrap().position(), target);
        assert!(matches!(
            body.set_leg_position("xx", target),
            Err(BodyError::UnknownLeg(_))
        ));

        // An unreachable target moves nothing
        let before = body.leg("fr").unwrap().angles();
        assert!(matches!(
            body.set_leg_position("fr", Point::new(0.0, 0.0, -30.0)),
            Err(BodyError::Leg(_))
        ));
        assert_eq!(body.leg("fr").unwrap().angles(), before);

        body.set_leg_joint("fl", Joint::Femur, 100.0).unwrap();
        assert_eq!(body.actuator().get_angle(3), Some(100.0));
        assert_eq!(body.leg("fl").unwrap().angles().femur, 100.0);
    }

    #[test]
    fn test_set_gait() {
        let mut body = test_body();

        body.set_gait("trot").unwrap();
        assert_eq!(body.gait(), "trot");
        assert!(matches!(body.set_gait("gallop"), Err(BodyError::UnknownGait(_))));
        assert_eq!(body.gait(), "trot");
    }

    #[test]
    fn test_calibration_through_body() {
        let mut body = test_body();
        body.set_leg_joint("fl", Joint::Cox, 95.0).unwrap();

        let path = std::env::temp_dir().join(format!(
            "walk_exec_body_calib_{}.json",
            std::process::id()
        ));
        body.save_calibration(&path).unwrap();
        body.load_calibration(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!((body.actuator().get(4).unwrap().calibration - 5.0).abs() < 1e-9);
    }
}
