//! # Geometry
//!
//! Homogeneous 3D point and transform algebra used by the kinematics and
//! gait code. Every angle in the system is expressed in degrees.
//!
//! Points are row vectors `(x, y, z, 1)` and transforms are applied by
//! right-multiplication (`point * transform`), so a transform's translation
//! lives in its bottom row and `a * b` means "apply `a`, then `b`".

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod dtrig;
mod point;
mod transform;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use dtrig::*;
pub use point::{Angles, Point, Point2D};
pub use transform::{Axis, Transform, TransformParseError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Tolerance used for approximate floating point equality.
pub const SMALL: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Approximate equality, either absolute or relative to the larger magnitude.
pub fn equal(x1: f64, x2: f64) -> bool {
    let diff = (x1 - x2).abs();
    let scale = x1.abs().max(x2.abs());

    diff < SMALL || (scale > 0.0 && diff / scale < SMALL)
}

/// Length of the hypotenuse of a right triangle with sides `x` and `y`.
pub fn hypot(x: f64, y: f64) -> f64 {
    x.hypot(y)
}

/// The angle in degrees opposite the side `opposite` of a triangle with the
/// other two sides `l1` and `l2`.
///
/// When the three lengths cannot quite form a triangle (a leg at full
/// stretch, where rounding pushes the cosine just past ±1) the cosine is
/// clamped rather than producing `NaN`, see [`dacos`].
pub fn cosine_rule(l1: f64, l2: f64, opposite: f64) -> f64 {
    dacos((l1 * l1 + l2 * l2 - opposite * opposite) / (2.0 * l1 * l2))
}
