//! Degree based trigonometry

use log::warn;

/// Degrees to radians
pub const D2R: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const R2D: f64 = 180.0 / std::f64::consts::PI;

pub fn dsin(angle_deg: f64) -> f64 {
    (angle_deg * D2R).sin()
}

pub fn dcos(angle_deg: f64) -> f64 {
    (angle_deg * D2R).cos()
}

pub fn dtan(angle_deg: f64) -> f64 {
    (angle_deg * D2R).tan()
}

/// Arc sine in degrees. Out of domain values are clamped to ±1.
pub fn dasin(s: f64) -> f64 {
    R2D * clamp_unit("dasin", s).asin()
}

/// Arc cosine in degrees.
///
/// Arguments outside `[-1, 1]` occur legitimately at the edge of a leg's
/// reach. They are clamped and logged rather than returning `NaN`.
pub fn dacos(c: f64) -> f64 {
    R2D * clamp_unit("dacos", c).acos()
}

pub fn datan(t: f64) -> f64 {
    R2D * t.atan()
}

/// Four quadrant arc tangent of `x / y` in degrees.
pub fn datan2(x: f64, y: f64) -> f64 {
    R2D * x.atan2(y)
}

fn clamp_unit(func: &str, value: f64) -> f64 {
    if value > 1.0 || value < -1.0 {
        warn!("{} argument {} out of range, clamped", func, value);
        value.max(-1.0).min(1.0)
    }
    else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dtrig() {
        assert!((dsin(30.0) - 0.5).abs() < 1e-12);
        assert!((dcos(60.0) - 0.5).abs() < 1e-12);
        assert!((dtan(45.0) - 1.0).abs() < 1e-12);
        assert!((datan2(1.0, 1.0) - 45.0).abs() < 1e-12);
        assert!((datan(1.0) - 45.0).abs() < 1e-12);
        assert!((dasin(0.5) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_dacos_clamps() {
        assert_eq!(dacos(1.0 + 1e-12), 0.0);
        assert!((dacos(-1.0 - 1e-12) - 180.0).abs() < 1e-12);
        assert!((dacos(2.0)).abs() < 1e-12);
    }
}
