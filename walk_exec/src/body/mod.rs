//! Walking body module
//!
//! The body owns the legs, gaits and postures and turns walk, posture and attitude commands into
//! coordinated leg moves. Every move of a set of legs is planned in full before any servo is
//! commanded, so a leg which cannot reach its target aborts the whole move rather than leaving
//! the other legs half way.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod calc_attitude;
mod calc_head;
mod calc_posture;
mod calc_step;
mod calc_walk;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calc_attitude::AttitudeAxis;
pub use params::*;
pub use state::*;

use crate::{
    gait::GaitError,
    leg::LegError,
    posture::PostureError,
    servo_ctrl::ServoError,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during Body operation.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("Unknown leg \"{0}\"")]
    UnknownLeg(String),

    #[error("Unknown gait \"{0}\"")]
    UnknownGait(String),

    #[error("Unknown posture \"{0}\"")]
    UnknownPosture(String),

    #[error("Unknown head position \"{0}\"")]
    UnknownHeadPosition(String),

    #[error("Unknown attitude axis \"{0}\"")]
    UnknownAttitudeAxis(String),

    #[error("The body has no legs")]
    NoLegs,

    #[error("Cancelled by the operator")]
    CancelledByOperator,

    #[error(transparent)]
    Leg(#[from] LegError),

    #[error(transparent)]
    Servo(#[from] ServoError),

    #[error(transparent)]
    Gait(#[from] GaitError),

    #[error("Invalid posture \"{name}\": {source}")]
    Posture {
        name: String,
        source: PostureError,
    },
}
