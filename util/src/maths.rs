//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the range `[0, 360)`.
pub fn wrap_deg<T>(angle_deg: T) -> T
where
    T: Float
{
    let full = T::from(360.0).unwrap_or_else(T::max_value);
    let wrapped = rem_euclid(angle_deg, full);

    // Round-off can land exactly on 360
    if wrapped >= full { T::zero() } else { wrapped }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 180f64), (102f64, 512f64), 0.0), 102.0);
        assert_eq!(lin_map((0f64, 180f64), (102f64, 512f64), 180.0), 512.0);
        assert_eq!(lin_map((0f64, 10f64), (1f64, -1f64), 5.0), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(200f64, 18.0, 162.0), 162.0);
        assert_eq!(clamp(-5f64, 18.0, 162.0), 18.0);
        assert_eq!(clamp(90f64, 18.0, 162.0), 90.0);
    }

    #[test]
    fn test_wrap_deg() {
        assert_eq!(wrap_deg(370f64), 10.0);
        assert_eq!(wrap_deg(-20f64), 340.0);
        assert_eq!(wrap_deg(360f64), 0.0);
        assert_eq!(wrap_deg(0f64), 0.0);
    }
}
