//! Per-leg mirrored coordinate frame

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::geometry::Point;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Conversion between the body (global) frame and a leg's local frame.
///
/// A leg's local frame has its origin at the hip mount, x pointing forward
/// and y pointing outward from the body. Legs mounted on the right hand side
/// (negative y) therefore see the body's y axis flipped, which lets the same
/// kinematics and postures serve both sides of the robot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    origin: Point,
    mirrored: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Frame {
    /// Build the frame for a leg mounted at `location` in the body frame.
    pub fn for_mount(location: Point) -> Self {
        Self {
            origin: location,
            mirrored: location.y() < 0.0,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Convert a local toe position into the body frame.
    pub fn to_global(&self, local: &Point) -> Point {
        self.origin + self.vector_to_global(local)
    }

    /// Convert a body frame position into the leg's local frame.
    pub fn to_local(&self, global: &Point) -> Point {
        self.vector_to_local(&(*global - self.origin))
    }

    /// Convert a displacement (rather than a position) into the body frame.
    pub fn vector_to_global(&self, delta: &Point) -> Point {
        self.reflect(delta)
    }

    /// Convert a body frame displacement into the leg's local frame.
    pub fn vector_to_local(&self, delta: &Point) -> Point {
        self.reflect(delta)
    }

    fn reflect(&self, p: &Point) -> Point {
        if self.mirrored {
            p.with_y(-p.y())
        }
        else {
            *p
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_left_frame() {
        let f = Frame::for_mount(Point::new(5.3, 5.0, 0.0));
        assert!(!f.is_mirrored());

        let local = Point::new(2.0, 1.0, -7.0);
        assert_eq!(f.to_global(&local), Point::new(7.3, 6.0, -7.0));
        assert_eq!(f.to_local(&f.to_global(&local)), local);
    }

    #[test]
    fn test_right_frame_is_mirrored() {
        let f = Frame::for_mount(Point::new(5.3, -5.0, 0.0));
        assert!(f.is_mirrored());

        // Outward in the local frame is -y in the body frame
        let local = Point::new(2.0, 1.0, -7.0);
        assert_eq!(f.to_global(&local), Point::new(7.3, -6.0, -7.0));
        assert_eq!(f.to_local(&f.to_global(&local)), local);

        // The same body frame displacement maps to mirrored local ones
        let delta = Point::new(0.5, 0.5, 0.0);
        assert_eq!(f.vector_to_local(&delta), Point::new(0.5, -0.5, 0.0));
    }
}
