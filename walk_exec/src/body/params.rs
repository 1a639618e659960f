//! Parameters structure for the Body

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::geometry::Point;
use crate::head::HeadParams;
use crate::leg::{LinkLengths, ServoIds};
use crate::servo_ctrl::ServoParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the walking body.
///
/// Any field missing from the parameter file takes its default value.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BodyParams {

    // ---- GEOMETRY ----

    /// Length of the femur of every leg without its own value.
    pub femur_length: f64,

    /// Length of the tibia of every leg without its own value.
    pub tibia_length: f64,

    /// The legs, keyed by their name (e.g. `fl` for front left).
    pub legs: BTreeMap<String, LegParams>,

    // ---- STEPPING ----

    /// Height the toe is raised off the ground before swinging.
    pub clear_height: f64,

    /// Height of the apex of a step above the ground.
    pub default_step_height: f64,

    /// Height of the body above the ground before any posture is set.
    pub default_height: f64,

    /// Length of a step when walking straight forward or backward.
    pub default_step_size: f64,

    /// Length of a step in any other direction.
    pub small_step_size: f64,

    // ---- MOTION ----

    /// Interpolation iterations per second, 0 for no delay.
    pub default_speed: f64,

    /// Largest change of any joint in a single interpolation iteration.
    ///
    /// Units: degrees
    pub max_servo_iteration: f64,

    pub servo: ServoParams,

    // ---- HEAD ----

    pub head: HeadParams,

    // ---- GAITS AND POSTURES ----

    /// Gait specifications keyed by name.
    pub gaits: BTreeMap<String, String>,

    pub default_gait: String,

    /// Posture specifications keyed by name.
    pub postures: BTreeMap<String, String>,

    /// Posture set when the executable starts.
    pub initial_posture: String,

    /// Calibration file, relative to the software root.
    pub calibration_filename: String,
}

/// Parameters of a single leg.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LegParams {
    /// Position of the hip mount in the body frame
    pub x: f64,
    pub y: f64,
    pub z: f64,

    pub servo_cox: u8,
    pub servo_femur: u8,
    pub servo_tibia: u8,

    /// Femur length overriding `BodyParams::femur_length`
    #[serde(default)]
    pub femur: Option<f64>,

    /// Tibia length overriding `BodyParams::tibia_length`
    #[serde(default)]
    pub tibia: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BodyParams {
    fn default() -> Self {
        let mut legs = BTreeMap::new();
        legs.insert("fl".to_string(), LegParams::new(5.3, 5.0, [4, 3, 2]));
        legs.insert("fr".to_string(), LegParams::new(5.3, -5.0, [11, 12, 13]));
        legs.insert("rl".to_string(), LegParams::new(-8.3, 5.0, [7, 6, 5]));
        legs.insert("rr".to_string(), LegParams::new(-8.3, -5.0, [8, 9, 10]));

        let mut gaits = BTreeMap::new();
        gaits.insert("default".to_string(), "fl,rl,rr,fr".to_string());
        gaits.insert("trot".to_string(), "fl+rr,fr+rl".to_string());

        let mut postures = BTreeMap::new();
        for (name, spec) in &[
            ("stand", "fl:2 -1.0 7, fr:2 -1.0 7, rl:0.3 -1 7, rr:0.3 -1 7"),
            ("relax", "6 0.0 6"),
            ("high", "fl:2.5 -1.5 10.5, fr:2.5 -1.5 10.5, rl:-1 -1.5 10.5, rr:-1 -1.5 10.5"),
            ("low", "1.1 -1.2 4"),
            ("sleep", "fl:x=4 z=0.3, fr:x=4 z=0.3, rl:x=0 z=0.3, rr:x=0 z=0.3"),
            ("sit", "fl:x=-2.9 y=-0.2 z=3, fr:x=-2.9 y=-0.2 z=3, rl:x=3.5 y=0 z=0.2, rr: x=3.5 y=0 z=0.2"),
        ] {
            postures.insert(name.to_string(), spec.to_string());
        }

        Self {
            femur_length: 5.3,
            tibia_length: 6.0,
            legs,
            clear_height: 0.5,
            default_step_height: 3.0,
            default_height: 7.0,
            default_step_size: 3.0,
            small_step_size: 0.8,
            default_speed: 10.0,
            max_servo_iteration: 5.0,
            servo: ServoParams::default(),
            head: HeadParams::default(),
            gaits,
            default_gait: "default".to_string(),
            postures,
            initial_posture: "relax".to_string(),
            calibration_filename: "calib.json".to_string(),
        }
    }
}

impl LegParams {
    fn new(x: f64, y: f64, servos: [u8; 3]) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            servo_cox: servos[0],
            servo_femur: servos[1],
            servo_tibia: servos[2],
            femur: None,
            tibia: None,
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y, self.z)
    }

    pub fn servo_ids(&self) -> ServoIds {
        ServoIds {
            cox: self.servo_cox,
            femur: self.servo_femur,
            tibia: self.servo_tibia,
        }
    }

    /// Link lengths of the leg, using the body's lengths where not overridden.
    pub fn links(&self, body: &BodyParams) -> LinkLengths {
        LinkLengths {
            femur: self.femur.unwrap_or(body.femur_length),
            tibia: self.tibia.unwrap_or(body.tibia_length),
        }
    }
}
