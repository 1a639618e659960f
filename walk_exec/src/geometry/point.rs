//! Points and angle triples

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use nalgebra::{RowVector4, Vector2};

use super::{datan2, dcos, dsin, equal, Transform};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A 3D point in homogeneous coordinates, `(x, y, z, 1)`.
///
/// Equality is approximate (see [`super::equal`]), never exact float equality.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    p: RowVector4<f64>,
}

/// A point in a leg's sagittal plane, used inside the leg kinematics.
#[derive(Clone, Copy, Debug)]
pub struct Point2D {
    p: Vector2<f64>,
}

/// Roll, pitch and yaw in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Angles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            p: RowVector4::new(x, y, z, 1.0),
        }
    }

    /// Build a point from a raw homogeneous row, resetting `w` to 1.
    pub(crate) fn from_row(mut p: RowVector4<f64>) -> Self {
        p[3] = 1.0;
        Self { p }
    }

    /// A point in the XY plane at `length` from the origin along `angle_deg`
    /// (measured counter-clockwise from the x axis).
    pub fn from_heading(length: f64, angle_deg: f64) -> Self {
        Self::new(length * dcos(angle_deg), length * dsin(angle_deg), 0.0)
    }

    pub fn x(&self) -> f64 {
        self.p[0]
    }

    pub fn y(&self) -> f64 {
        self.p[1]
    }

    pub fn z(&self) -> f64 {
        self.p[2]
    }

    pub fn with_x(&self, x: f64) -> Self {
        Self::new(x, self.y(), self.z())
    }

    pub fn with_y(&self, y: f64) -> Self {
        Self::new(self.x(), y, self.z())
    }

    pub fn with_z(&self, z: f64) -> Self {
        Self::new(self.x(), self.y(), z)
    }

    /// Distance from the origin.
    pub fn length(&self) -> f64 {
        self.dist(&Point::default())
    }

    pub fn dist(&self, other: &Point) -> f64 {
        self.dist2(other).sqrt()
    }

    pub fn dist2(&self, other: &Point) -> f64 {
        let d = *self - *other;
        d.x() * d.x() + d.y() * d.y() + d.z() * d.z()
    }

    /// The point a fraction `t` of the way from `self` to `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Self {
        (*other - *self) * t + *self
    }

    pub fn midpoint(&self, other: &Point) -> Self {
        self.lerp(other, 0.5)
    }

    /// Apply a transform to the point (`self * transform`).
    pub fn apply(&self, transform: &Transform) -> Self {
        Self::from_row(self.p * transform.matrix())
    }

    /// Equality within an explicit absolute tolerance.
    pub fn approx_eq(&self, other: &Point, tol: f64) -> bool {
        (self.x() - other.x()).abs() <= tol
            && (self.y() - other.y()).abs() <= tol
            && (self.z() - other.z()).abs() <= tol
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        equal(self.x(), other.x()) && equal(self.y(), other.y()) && equal(self.z(), other.z())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={:.3} y={:.3} z={:.3})", self.x(), self.y(), self.z())
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x() + rhs.x(), self.y() + rhs.y(), self.z() + rhs.z())
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x() - rhs.x(), self.y() - rhs.y(), self.z() - rhs.z())
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        *self = *self - rhs;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x(), -self.y(), -self.z())
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x() * rhs, self.y() * rhs, self.z() * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x() / rhs, self.y() / rhs, self.z() / rhs)
    }
}

impl Mul<Transform> for Point {
    type Output = Point;

    fn mul(self, rhs: Transform) -> Point {
        self.apply(&rhs)
    }
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            p: Vector2::new(x, y),
        }
    }

    /// Build a point from polar coordinates, with `theta_deg` measured from
    /// the y axis towards the x axis.
    pub fn from_polar(r: f64, theta_deg: f64) -> Self {
        Self::new(r * dsin(theta_deg), r * dcos(theta_deg))
    }

    pub fn x(&self) -> f64 {
        self.p[0]
    }

    pub fn y(&self) -> f64 {
        self.p[1]
    }

    pub fn length(&self) -> f64 {
        self.p.norm()
    }

    /// Polar angle, the inverse of [`Point2D::from_polar`].
    pub fn angle(&self) -> f64 {
        datan2(self.x(), self.y())
    }

    pub fn reflect_x(&self) -> Self {
        Self::new(self.x(), -self.y())
    }

    pub fn reflect_y(&self) -> Self {
        Self::new(-self.x(), self.y())
    }
}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        equal(self.x(), other.x()) && equal(self.y(), other.y())
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={:.3} y={:.3})", self.x(), self.y())
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D { p: self.p + rhs.p }
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D { p: self.p - rhs.p }
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;

    fn mul(self, rhs: f64) -> Point2D {
        Point2D { p: self.p * rhs }
    }
}

impl Angles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

impl fmt::Display for Angles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(roll={:.1} pitch={:.1} yaw={:.1})",
            self.roll, self.pitch, self.yaw
        )
    }
}

impl Add for Angles {
    type Output = Angles;

    fn add(self, rhs: Angles) -> Angles {
        Angles::new(self.roll + rhs.roll, self.pitch + rhs.pitch, self.yaw + rhs.yaw)
    }
}

impl Sub for Angles {
    type Output = Angles;

    fn sub(self, rhs: Angles) -> Angles {
        Angles::new(self.roll - rhs.roll, self.pitch - rhs.pitch, self.yaw - rhs.yaw)
    }
}

impl Neg for Angles {
    type Output = Angles;

    fn neg(self) -> Angles {
        Angles::new(-self.roll, -self.pitch, -self.yaw)
    }
}

impl Mul<f64> for Angles {
    type Output = Angles;

    fn mul(self, rhs: f64) -> Angles {
        Angles::new(self.roll * rhs, self.pitch * rhs, self.yaw * rhs)
    }
}
