//! Walking a distance

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use util::maths::wrap_deg;

use super::{Body, BodyError};
use crate::geometry::{Point, Transform};
use crate::pause::PauseHook;
use crate::servo_ctrl::JointActuator;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Headings within this many degrees of straight ahead (or straight back) use the full step size.
const STRAIGHT_WINDOW_DEG: f64 = 20.0;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Body<A> {
    /// Walk `distance` along the heading `direction` (degrees counter-clockwise from forward),
    /// turning by a total of `turn` degrees on the way.
    ///
    /// The walk is followed by a full gait cycle of settling steps which plant every leg back on
    /// its rest position. Returns the number of strides taken, not counting settling steps.
    pub fn walk<P: PauseHook>(
        &mut self,
        distance: f64,
        direction: f64,
        turn: f64,
        pause: &mut P,
    ) -> Result<usize, BodyError> {
        let direction = wrap_deg(direction);
        let step_size = self.step_size_for(direction);

        let step_count = (distance.max(0.0) / step_size).floor() as usize;
        if step_count == 0 {
            warn!(
                "Walk of {:.2} is shorter than one step of {:.2}, only settling",
                distance, step_size
            );
            self.settle(pause)?;
            return Ok(0);
        }

        let stride = Transform::zrot(turn / step_count as f64)
            * Transform::from_translation(Point::from_heading(step_size, direction));

        info!(
            "Walking {} steps of {:.2} heading {:.1} turning {:.1}",
            step_count, step_size, direction, turn
        );

        for _ in 0..step_count {
            self.step(&stride, self.step_height, pause)?;
        }

        self.settle(pause)?;

        Ok(step_count)
    }

    /// Step size for a heading in `[0, 360)`.
    fn step_size_for(&self, direction: f64) -> f64 {
        let straight = direction <= STRAIGHT_WINDOW_DEG
            || direction >= 360.0 - STRAIGHT_WINDOW_DEG
            || (direction >= 180.0 - STRAIGHT_WINDOW_DEG && direction <= 180.0 + STRAIGHT_WINDOW_DEG);

        if straight {
            self.step_size
        }
        else {
            self.params.small_step_size
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::calc_step::test::CancelAt;
    use super::super::state::test::test_body;
    use super::*;
    use crate::pause::NoPause;

    #[test]
    fn test_walk_step_count() {
        let mut body = test_body();
        body.step_size = 1.0;

        let steps = body.walk(4.0, 0.0, 0.0, &mut NoPause).unwrap();

        // Four strides plus a cycle of settling steps
        assert_eq!(steps, 4);
        assert_eq!(body.steps_taken(), 4 + 4);
        assert_eq!(body.position(), Point::new(4.0, 0.0, 0.0));

        for leg in body.legs() {
            assert!(leg.position().approx_eq(&leg.rest_position(), 1e-6));
        }
    }

    #[test]
    fn test_walk_step_size_by_heading() {
        let body = test_body();

        assert_eq!(body.step_size_for(0.0), 3.0);
        assert_eq!(body.step_size_for(345.0), 3.0);
        assert_eq!(body.step_size_for(180.0), 3.0);
        assert_eq!(body.step_size_for(90.0), 0.8);
        assert_eq!(body.step_size_for(21.0), 0.8);
    }

    #[test]
    fn test_walk_sideways_and_back() {
        let mut body = test_body();

        assert_eq!(body.walk(2.0, 90.0, 0.0, &mut NoPause).unwrap(), 2);
        assert!(body.position().approx_eq(&Point::new(0.0, 1.6, 0.0), 1e-9));

        // -180 wraps to straight back, full sized steps
        assert_eq!(body.walk(3.0, -180.0, 0.0, &mut NoPause).unwrap(), 1);
        assert!(body.position().approx_eq(&Point::new(-3.0, 1.6, 0.0), 1e-9));
    }

    #[test]
    fn test_walk_too_short() {
        let mut body = test_body();

        let stride = Transform::from_translation(Point::new(1.0, 0.0, 0.0));
        body.step(&stride, 3.0, &mut NoPause).unwrap();

        // No strides, but the legs are still settled
        assert_eq!(body.walk(0.5, 0.0, 0.0, &mut NoPause).unwrap(), 0);
        assert_eq!(body.steps_taken(), 1 + 4);
        assert_eq!(body.position(), Point::new(1.0, 0.0, 0.0));

        for leg in body.legs() {
            assert!(leg.position().approx_eq(&leg.rest_position(), 1e-6));
        }
    }

    #[test]
    fn test_walk_with_large_turn() {
        let mut body = test_body();

        // Ten strides of 18 degrees and 3 across two and a half gait cycles
        assert_eq!(body.walk(30.0, 0.0, 180.0, &mut NoPause).unwrap(), 10);
        assert_eq!(body.steps_taken(), 10 + 4);

        for leg in body.legs() {
            assert!(leg.position().approx_eq(&leg.rest_position(), 1e-6));
        }
    }

    #[test]
    fn test_turn_on_the_spot() {
        let mut body = test_body();
        body.step_size = 0.5;

        assert_eq!(body.walk(1.0, 0.0, 10.0, &mut NoPause).unwrap(), 2);

        for leg in body.legs() {
            assert!(leg.position().approx_eq(&leg.rest_position(), 1e-6));
        }
    }

    #[test]
    fn test_walk_cancel_stops() {
        let mut body = test_body();

        // Continue through the first step's four phases, cancel during the second
        let mut hook = CancelAt {
            remaining: 5,
            calls: 0,
        };
        let e = body.walk(9.0, 0.0, 0.0, &mut hook).unwrap_err();

        assert!(matches!(e, BodyError::CancelledByOperator));
        assert_eq!(body.steps_taken(), 2);
        assert!(body.legs().iter().all(|l| !l.is_stepping()));
    }
}
