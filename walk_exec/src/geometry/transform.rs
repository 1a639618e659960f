//! Homogeneous rigid transforms

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use nalgebra::{Matrix2, Matrix3, Matrix4, RowVector2, U1, U3};
use thiserror::Error;

use super::{datan2, dcos, dsin, Point};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Below this yaw a transform is treated as a pure translation when taking its fraction.
const MIN_FRACTION_YAW_DEG: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A 4x4 homogeneous transform: a rotation (upper-left 3x3) followed by a
/// translation (bottom row).
///
/// Transforms are only ever built from axis rotations and translations, so
/// the rotation block is always orthonormal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    m: Matrix4<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Errors parsing a transform string.
#[derive(Debug, Error, PartialEq)]
pub enum TransformParseError {
    #[error("Empty transform specification")]
    Empty,

    #[error("Expected a number in transform specification, found '{0}'")]
    InvalidNumber(String),

    #[error("Unknown transform key '{0}', expected one of x, y, z, xrot, yrot, zrot")]
    UnknownKey(String),

    #[error("Expected 'key=value' in transform specification, found '{0}'")]
    MissingValue(String),

    #[error("Too many values in transform specification ({0}, at most 6 allowed)")]
    TooManyValues(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Transform {
    pub fn identity() -> Self {
        Self {
            m: Matrix4::identity(),
        }
    }

    pub(crate) fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    /// A pure translation.
    pub fn from_translation(p: Point) -> Self {
        Self::identity().with_translation(p)
    }

    /// A pure rotation of `angle_deg` about `axis`, counter-clockwise when
    /// looking down the axis towards the origin.
    pub fn rotation(axis: Axis, angle_deg: f64) -> Self {
        let c = dcos(angle_deg);
        let s = dsin(angle_deg);

        // Row vector convention, so these are the transposes of the familiar
        // column vector rotation matrices.
        let m = match axis {
            Axis::X => Matrix4::new(
                1.0, 0.0, 0.0, 0.0,
                0.0, c, s, 0.0,
                0.0, -s, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
            Axis::Y => Matrix4::new(
                c, 0.0, -s, 0.0,
                0.0, 1.0, 0.0, 0.0,
                s, 0.0, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
            Axis::Z => Matrix4::new(
                c, s, 0.0, 0.0,
                -s, c, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
        };

        Self { m }
    }

    pub fn xrot(angle_deg: f64) -> Self {
        Self::rotation(Axis::X, angle_deg)
    }

    pub fn yrot(angle_deg: f64) -> Self {
        Self::rotation(Axis::Y, angle_deg)
    }

    pub fn zrot(angle_deg: f64) -> Self {
        Self::rotation(Axis::Z, angle_deg)
    }

    /// Composition, `self` applied first and then `other`.
    pub fn compose(&self, other: &Transform) -> Self {
        Self {
            m: self.m * other.m,
        }
    }

    /// The inverse transform.
    ///
    /// Since the rotation block is orthonormal its inverse is its transpose,
    /// and the inverse translation is `-t * R^T`.
    pub fn inverse(&self) -> Self {
        let rot_t = self.m.fixed_slice::<U3, U3>(0, 0).transpose();
        let trans = self.m.fixed_slice::<U1, U3>(3, 0).into_owned();

        let mut m = Matrix4::identity();
        m.fixed_slice_mut::<U3, U3>(0, 0).copy_from(&rot_t);
        m.fixed_slice_mut::<U1, U3>(3, 0).copy_from(&(-(trans * rot_t)));

        Self { m }
    }

    /// A transform which applied `n` times gives this one.
    ///
    /// Only defined for a rotation about z combined with a translation. Such a transform turns
    /// the xy plane about a fixed centre, so its root turns about the same centre by `1/n` of
    /// the angle.
    pub fn fraction(&self, n: usize) -> Self {
        if n == 0 {
            return Self::identity();
        }

        let n = n as f64;
        let t = self.translation();
        let (c, s) = (self.m[(0, 0)], self.m[(0, 1)]);
        let yaw = datan2(s, c);

        // Centre of rotation, the point left in place: `p (I - R) = t`
        let centre = Matrix2::new(1.0 - c, -s, s, 1.0 - c)
            .try_inverse()
            .filter(|_| yaw.abs() > MIN_FRACTION_YAW_DEG)
            .map(|a_inv| RowVector2::new(t.x(), t.y()) * a_inv);

        match centre {
            Some(centre) => {
                let centre = Point::new(centre[0], centre[1], 0.0);
                Self::from_translation(-centre)
                    * Self::zrot(yaw / n)
                    * Self::from_translation(centre + Point::new(0.0, 0.0, t.z() / n))
            }
            None => Self::from_translation(t / n),
        }
    }

    pub fn translation(&self) -> Point {
        Point::new(self.m[(3, 0)], self.m[(3, 1)], self.m[(3, 2)])
    }

    /// A copy with the translation replaced.
    pub fn with_translation(&self, p: Point) -> Self {
        let mut m = self.m;
        m[(3, 0)] = p.x();
        m[(3, 1)] = p.y();
        m[(3, 2)] = p.z();
        Self { m }
    }

    /// A copy with `p` added to the translation.
    pub fn add_translation(&self, p: Point) -> Self {
        self.with_translation(self.translation() + p)
    }

    /// A copy with the translation removed.
    pub fn rotation_only(&self) -> Self {
        self.with_translation(Point::default())
    }

    /// True if the rotation block is orthonormal within `tol`.
    pub fn is_rigid(&self, tol: f64) -> bool {
        let rot = self.m.fixed_slice::<U3, U3>(0, 0);
        let orthonormal = (rot * rot.transpose() - Matrix3::identity()).amax() <= tol;

        orthonormal
            && self.m.fixed_slice::<U3, U1>(0, 3).iter().all(|v| *v == 0.0)
            && self.m[(3, 3)] == 1.0
    }

    /// Element-wise comparison within `tol`.
    pub fn approx_eq(&self, other: &Transform, tol: f64) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..4 {
            writeln!(
                f,
                "[{:8.3} {:8.3} {:8.3} {:8.3}]",
                self.m[(i, 0)],
                self.m[(i, 1)],
                self.m[(i, 2)],
                self.m[(i, 3)]
            )?;
        }
        Ok(())
    }
}

impl FromStr for Transform {
    type Err = TransformParseError;

    /// Parse either up to six positional numbers, `"x y z xrot yrot zrot"`
    /// (missing trailing values are zero), or space separated `key=value`
    /// pairs drawn from `x, y, z, xrot, yrot, zrot`.
    ///
    /// Rotations are applied in the order given.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();

        if words.is_empty() {
            return Err(TransformParseError::Empty);
        }

        if words.iter().any(|w| w.contains('=')) {
            let mut pairs = Vec::with_capacity(words.len());
            for w in &words {
                let mut kv = w.splitn(2, '=');
                let key = kv.next().unwrap_or_default();
                let value = match kv.next() {
                    Some(v) if !v.is_empty() => parse_number(v)?,
                    _ => return Err(TransformParseError::MissingValue(w.to_string())),
                };
                pairs.push((key, value));
            }
            from_pairs(&pairs)
        }
        else {
            if words.len() > 6 {
                return Err(TransformParseError::TooManyValues(words.len()));
            }

            const KEYS: [&str; 6] = ["x", "y", "z", "xrot", "yrot", "zrot"];

            let mut pairs = Vec::with_capacity(words.len());
            for (key, w) in KEYS.iter().zip(words.iter()) {
                pairs.push((*key, parse_number(w)?));
            }
            from_pairs(&pairs)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_number(s: &str) -> Result<f64, TransformParseError> {
    s.parse::<f64>()
        .map_err(|_| TransformParseError::InvalidNumber(s.to_string()))
}

fn from_pairs(pairs: &[(&str, f64)]) -> Result<Transform, TransformParseError> {
    let mut rotation = Transform::identity();
    let mut xlate = Point::default();

    for (key, value) in pairs {
        match *key {
            "x" => xlate = xlate.with_x(*value),
            "y" => xlate = xlate.with_y(*value),
            "z" => xlate = xlate.with_z(*value),
            "xrot" => rotation = rotation * Transform::xrot(*value),
            "yrot" => rotation = rotation * Transform::yrot(*value),
            "zrot" => rotation = rotation * Transform::zrot(*value),
            other => return Err(TransformParseError::UnknownKey(other.to_string())),
        }
    }

    Ok(rotation.with_translation(xlate))
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector3;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_rotations_are_counter_clockwise() {
        let p = Point::new(1.0, 0.0, 0.0);
        assert!(p.apply(&Transform::zrot(90.0)).approx_eq(&Point::new(0.0, 1.0, 0.0), TOL));

        let p = Point::new(0.0, 1.0, 0.0);
        assert!(p.apply(&Transform::xrot(90.0)).approx_eq(&Point::new(0.0, 0.0, 1.0), TOL));

        let p = Point::new(0.0, 0.0, 1.0);
        assert!(p.apply(&Transform::yrot(90.0)).approx_eq(&Point::new(1.0, 0.0, 0.0), TOL));
    }

    #[test]
    fn test_compose_order() {
        let rot = Transform::zrot(90.0);
        let xlate = Transform::from_translation(Point::new(1.0, 0.0, 0.0));
        let p = Point::new(1.0, 0.0, 0.0);

        // Rotate then translate
        assert!((p * (rot * xlate)).approx_eq(&Point::new(1.0, 1.0, 0.0), TOL));

        // Translate then rotate
        assert!((p * (xlate * rot)).approx_eq(&Point::new(0.0, 2.0, 0.0), TOL));
    }

    #[test]
    fn test_inverse() {
        let t = Transform::xrot(12.0)
            * Transform::yrot(-33.0)
            * Transform::zrot(71.0)
            * Transform::from_translation(Point::new(1.5, -2.0, 0.25));

        assert!(t.is_rigid(TOL));
        assert!((t * t.inverse()).approx_eq(&Transform::identity(), TOL));
        assert!((t.inverse() * t).approx_eq(&Transform::identity(), TOL));

        let p = Point::new(3.0, 4.0, 5.0);
        assert!(p.apply(&t).apply(&t.inverse()).approx_eq(&p, TOL));

        // Agrees with the general matrix inverse
        let general = Transform {
            m: t.matrix().try_inverse().unwrap(),
        };
        assert!(t.inverse().approx_eq(&general, TOL));
    }

    #[test]
    fn test_fraction() {
        let stride = Transform::zrot(18.0) * Transform::from_translation(Point::new(3.0, 0.0, 0.0));

        let root = stride.fraction(5);
        let mut t = Transform::identity();
        for _ in 0..5 {
            t = t * root;
        }
        assert!(t.approx_eq(&stride, TOL));

        // The inverse splits the same way
        let back = stride.inverse().fraction(6);
        let mut t = stride;
        for _ in 0..6 {
            t = t * back;
        }
        assert!(t.approx_eq(&Transform::identity(), TOL));

        // Pure translations divide their translation
        let xlate = Transform::from_translation(Point::new(-1.0, 0.5, 0.0));
        assert!(xlate
            .fraction(4)
            .approx_eq(&Transform::from_translation(Point::new(-0.25, 0.125, 0.0)), TOL));
        assert!(xlate.fraction(0).approx_eq(&Transform::identity(), TOL));
    }

    #[test]
    fn test_is_rigid() {
        assert!(Transform::identity().is_rigid(TOL));
        assert!(Transform::zrot(45.0)
            .with_translation(Point::new(1.0, 2.0, 3.0))
            .is_rigid(TOL));

        let scaled = Transform {
            m: Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0)),
        };
        assert!(!scaled.is_rigid(TOL));
    }

    #[test]
    fn test_translation_helpers() {
        let t = Transform::zrot(30.0).with_translation(Point::new(1.0, 2.0, 3.0));
        assert_eq!(t.translation(), Point::new(1.0, 2.0, 3.0));
        assert_eq!(
            t.add_translation(Point::new(1.0, 1.0, 1.0)).translation(),
            Point::new(2.0, 3.0, 4.0)
        );
        assert!(t.rotation_only().approx_eq(&Transform::zrot(30.0), TOL));
    }

    #[test]
    fn test_parse_positional() {
        let t: Transform = "2 -1.0 7".parse().unwrap();
        assert_eq!(t.translation(), Point::new(2.0, -1.0, 7.0));
        assert!(t.rotation_only().approx_eq(&Transform::identity(), TOL));

        let t: Transform = "1 2 3 0 0 90".parse().unwrap();
        assert_eq!(t.translation(), Point::new(1.0, 2.0, 3.0));
        assert!(t.rotation_only().approx_eq(&Transform::zrot(90.0), TOL));
    }

    #[test]
    fn test_parse_pairs() {
        let t: Transform = " x=3.5 y=0 z=0.2".parse().unwrap();
        assert_eq!(t.translation(), Point::new(3.5, 0.0, 0.2));

        let t: Transform = "zrot=45 x=1".parse().unwrap();
        assert_eq!(t.translation(), Point::new(1.0, 0.0, 0.0));
        assert!(t.rotation_only().approx_eq(&Transform::zrot(45.0), TOL));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Transform>(), Err(TransformParseError::Empty));
        assert_eq!(
            "1 2 x".parse::<Transform>(),
            Err(TransformParseError::InvalidNumber("x".to_string()))
        );
        assert_eq!(
            "w=1".parse::<Transform>(),
            Err(TransformParseError::UnknownKey("w".to_string()))
        );
        assert_eq!(
            "x= y=2".parse::<Transform>(),
            Err(TransformParseError::MissingValue("x=".to_string()))
        );
        assert_eq!(
            "1 2 3 4 5 6 7".parse::<Transform>(),
            Err(TransformParseError::TooManyValues(7))
        );
    }
}
