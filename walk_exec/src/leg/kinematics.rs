//! Leg forward and inverse kinematics
//!
//! A leg has a hip yaw joint (cox) which swings the leg's plane about the
//! local x axis, and two links, femur and tibia, moving within that plane.
//! All angles are servo angles in degrees, with 90 being the neutral pose.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use super::LegAngles;
use crate::geometry::{cosine_rule, datan2, dcos, dsin, hypot, Point, Point2D, SMALL};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Link lengths of a leg.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LinkLengths {
    pub femur: f64,
    pub tibia: f64,
}

/// The toe position cannot be reached by the leg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unreachable {
    /// Distance from the hip to the target
    pub distance: f64,

    /// Maximum reach of the leg
    pub reach: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kinds of leg supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegKind {
    /// Cox yaw joint plus a two link (femur, tibia) leg, as on a quadruped.
    Quad,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LinkLengths {
    /// Maximum distance from the hip to the toe.
    pub fn reach(&self) -> f64 {
        self.femur + self.tibia
    }
}

impl LegKind {
    /// Joint angles which put the toe at `toe` (leg local frame).
    pub fn inverse(&self, links: &LinkLengths, toe: &Point) -> Result<LegAngles, Unreachable> {
        match self {
            LegKind::Quad => {
                // Swing the leg's plane to contain the toe, then solve the
                // two link problem within the plane.
                let cox = datan2(toe.y(), -toe.z());
                let planar = Point2D::new(toe.x(), hypot(toe.y(), toe.z()));

                let mut angles = femur_tibia(links, &planar)?;
                angles.cox = cox + 90.0;

                Ok(angles)
            }
        }
    }

    /// Toe position (leg local frame) for the given joint angles.
    pub fn forward(&self, links: &LinkLengths, angles: &LegAngles) -> Point {
        match self {
            LegKind::Quad => {
                let planar = toe_pos_2d(links, angles);
                let cox = angles.cox - 90.0;

                Point::new(
                    planar.x(),
                    planar.y() * dsin(cox),
                    -planar.y() * dcos(cox),
                )
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Solve the femur and tibia angles for a toe in the leg's plane.
///
/// The planar point is `(forward, down)` from the hip. Polar angles are
/// measured from straight down towards forward.
fn femur_tibia(links: &LinkLengths, toe: &Point2D) -> Result<LegAngles, Unreachable> {
    let h = toe.length();
    let reach = links.reach();

    if h - reach > SMALL || h < SMALL {
        return Err(Unreachable { distance: h, reach });
    }

    // Angle of the toe, and the angle at the hip between the toe and the knee
    let alpha = toe.angle();
    let beta = cosine_rule(h, links.femur, links.tibia);

    Ok(LegAngles {
        cox: 0.0,
        femur: 90.0 - (beta - alpha),
        tibia: cosine_rule(links.tibia, links.femur, h),
    })
}

/// Position of the toe in the leg's plane.
fn toe_pos_2d(links: &LinkLengths, angles: &LegAngles) -> Point2D {
    let femur_dir = angles.femur - 90.0;
    let knee = Point2D::from_polar(links.femur, femur_dir);

    // The tibia angle is the knee's interior angle, measured back from the
    // direction of the hip.
    let tibia_dir = femur_dir + 180.0 - angles.tibia;

    knee + Point2D::from_polar(links.tibia, tibia_dir)
}

#[cfg(test)]
mod test {
    use super::*;

    const LINKS: LinkLengths = LinkLengths {
        femur: 5.3,
        tibia: 6.0,
    };

    #[test]
    fn test_straight_down() {
        // Fully stretched straight down: every joint at neutral bar the knee
        let toe = Point::new(0.0, 0.0, -LINKS.reach());
        let angles = LegKind::Quad.inverse(&LINKS, &toe).unwrap();

        assert!((angles.cox - 90.0).abs() < 1e-6);
        assert!((angles.femur - 90.0).abs() < 1e-6);
        assert!((angles.tibia - 180.0).abs() < 1e-6);

        assert!(LegKind::Quad.forward(&LINKS, &angles).approx_eq(&toe, 1e-6));
    }

    #[test]
    fn test_round_trip() {
        let mut count = 0;

        // Sweep a grid of targets, checking every reachable one
        for ix in -10..=10 {
            for iy in -10..=10 {
                for iz in -11..=2 {
                    let toe = Point::new(ix as f64, iy as f64 * 0.8, iz as f64);
                    let h = toe.length();

                    if h > LINKS.reach() || h <= (LINKS.tibia - LINKS.femur).abs() {
                        continue;
                    }

                    let angles = LegKind::Quad.inverse(&LINKS, &toe).unwrap();
                    let back = LegKind::Quad.forward(&LINKS, &angles);

                    assert!(
                        back.approx_eq(&toe, 1e-6),
                        "round trip of {} gave {} via {:?}",
                        toe,
                        back,
                        angles
                    );
                    count += 1;
                }
            }
        }

        assert!(count > 1000);
    }

    #[test]
    fn test_round_trip_at_full_reach() {
        let toe = Point::new(3.0, -2.0, -6.0);
        let toe = toe * (LINKS.reach() / toe.length());

        let angles = LegKind::Quad.inverse(&LINKS, &toe).unwrap();
        assert!(!angles.femur.is_nan() && !angles.tibia.is_nan());
        assert!(LegKind::Quad.forward(&LINKS, &angles).approx_eq(&toe, 1e-6));
    }

    #[test]
    fn test_unreachable() {
        for extra in &[1e-6, 0.01, 1.0, 100.0] {
            let toe = Point::new(0.0, 2.0, -1.0);
            let toe = toe * ((LINKS.reach() + extra) / toe.length());

            let e = LegKind::Quad.inverse(&LINKS, &toe).unwrap_err();
            assert!(e.distance > e.reach);
        }

        // The hip itself is degenerate
        assert!(LegKind::Quad.inverse(&LINKS, &Point::default()).is_err());
    }
}
