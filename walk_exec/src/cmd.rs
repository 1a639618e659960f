//! Commands driving the body
//!
//! Commands are read one per line from a script, a keyword followed by space separated
//! arguments, for example `walk 10 90` or `posture stand`. Each line is parsed as a command line
//! so `help` and `<cmd> --help` describe the arguments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::iter;
use std::str::FromStr;

use structopt::clap::AppSettings;
use structopt::StructOpt;

use crate::body::AttitudeAxis;
use crate::leg::Joint;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to the walking body.
#[derive(Clone, Debug, PartialEq, StructOpt)]
#[structopt(name = "cmd")]
pub enum Cmd {
    /// Walk a distance along a heading.
    #[structopt(name = "walk", setting = AppSettings::AllowNegativeNumbers)]
    Walk {
        distance: f64,

        /// Degrees counter-clockwise from forward
        #[structopt(default_value = "0")]
        direction: f64,
    },

    /// Walk a distance while turning.
    #[structopt(name = "turn", setting = AppSettings::AllowNegativeNumbers)]
    Turn {
        distance: f64,

        /// Total turn in degrees, positive to the left
        angle: f64,

        #[structopt(default_value = "0")]
        direction: f64,
    },

    /// Set the body height.
    #[structopt(name = "height", setting = AppSettings::AllowNegativeNumbers)]
    Height { height: f64 },

    /// Set a named posture.
    #[structopt(name = "posture")]
    Posture { name: String },

    /// Move one leg's toe to a position in the leg's frame.
    #[structopt(name = "leg", setting = AppSettings::AllowNegativeNumbers)]
    Leg { leg: String, x: f64, y: f64, z: f64 },

    /// Set a single joint angle directly.
    #[structopt(name = "joint", setting = AppSettings::AllowNegativeNumbers)]
    Joint {
        leg: String,

        /// cox, femur or tibia
        joint: Joint,

        angle: f64,
    },

    /// Adjust the body attitude. Every axis but `normal` needs a value.
    #[structopt(name = "attitude", setting = AppSettings::AllowNegativeNumbers)]
    Attitude { axis: AttitudeAxis, value: Option<f64> },

    /// Move the toes outward from their posture.
    #[structopt(name = "spread", setting = AppSettings::AllowNegativeNumbers)]
    Spread { value: f64 },

    /// Move the toes away from the body's centre along its length.
    #[structopt(name = "stretch", setting = AppSettings::AllowNegativeNumbers)]
    Stretch { value: f64 },

    /// Select a named gait.
    #[structopt(name = "gait")]
    Gait { name: String },

    /// Set the interpolation speed, 0 for no delay.
    #[structopt(name = "speed")]
    Speed { speed: f64 },

    /// Sleep for a number of seconds.
    #[structopt(name = "wait")]
    Wait {
        #[structopt(parse(try_from_str = parse_seconds))]
        seconds: f64,
    },

    /// Tilt the head to an angle or a named position.
    #[structopt(name = "head", setting = AppSettings::AllowNegativeNumbers)]
    Head {
        #[structopt(parse(from_str))]
        target: HeadTarget,
    },

    /// Save the servo calibration.
    #[structopt(name = "save")]
    Save,

    /// Log the state of the body.
    #[structopt(name = "show")]
    Show(ShowItem),
}

/// Items which can be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, StructOpt)]
pub enum ShowItem {
    #[structopt(name = "legs")]
    Legs,

    #[structopt(name = "attitude")]
    Attitude,

    #[structopt(name = "position")]
    Position,
}

/// Where to tilt the head.
#[derive(Clone, Debug, PartialEq)]
pub enum HeadTarget {
    Angle(f64),
    Named(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CmdParseError {
    #[error("Empty command")]
    Empty,

    #[error("Attitude axis {0:?} needs a value")]
    MissingValue(AttitudeAxis),

    #[error(transparent)]
    Invalid(#[from] structopt::clap::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FromStr for Cmd {
    type Err = CmdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(CmdParseError::Empty);
        }

        let cmd = Cmd::from_iter_safe(iter::once("cmd").chain(s.split_whitespace()))?;

        match cmd {
            Cmd::Attitude { axis, value: None } if axis != AttitudeAxis::Normal => {
                Err(CmdParseError::MissingValue(axis))
            }
            cmd => Ok(cmd),
        }
    }
}

impl From<&str> for HeadTarget {
    fn from(s: &str) -> Self {
        match s.parse::<f64>() {
            Ok(angle) => HeadTarget::Angle(angle),
            Err(_) => HeadTarget::Named(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_seconds(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(secs) if secs >= 0.0 => Ok(secs),
        Ok(_) => Err(format!("cannot wait a negative time ({})", s)),
        Err(e) => Err(e.to_string()),
    }
}
