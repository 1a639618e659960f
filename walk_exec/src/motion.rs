//! # Motion Batch
//!
//! A set of simultaneous joint angle targets executed as one smooth, rate limited move. The joint
//! with the furthest to travel is limited to `max_deg_per_iter` each iteration and every other
//! joint moves proportionally, so the whole batch starts and finishes together.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::servo_ctrl::{JointActuator, ServoError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One coordinated, rate limited, multi-joint move.
#[derive(Clone, Debug)]
pub struct MotionBatch {
    /// Pending `(channel, target)` pairs in insertion order
    actions: Vec<(u8, f64)>,

    /// Largest change in angle any joint makes in one iteration
    max_deg_per_iter: f64,

    /// Iterations per second, or 0 to run without pausing
    speed: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotionBatch {
    pub fn new(max_deg_per_iter: f64, speed: f64) -> Self {
        Self {
            actions: Vec::new(),
            max_deg_per_iter,
            speed,
        }
    }

    /// Set the target of a channel. The last target for a channel wins.
    pub fn append(&mut self, channel: u8, angle_deg: f64) {
        match self.actions.iter_mut().find(|(c, _)| *c == channel) {
            Some(action) => action.1 = angle_deg,
            None => self.actions.push((channel, angle_deg)),
        }
    }

    /// The pending target of a channel.
    pub fn get(&self, channel: u8) -> Option<f64> {
        self.actions
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, a)| *a)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Discard every pending target.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Execute the batch on the actuator, clearing it afterwards.
    ///
    /// Every channel is checked before any angle is written, so an unknown channel fails the
    /// whole batch without moving anything. Returns the number of iterations run.
    pub fn exec<A: JointActuator>(&mut self, actuator: &mut A) -> Result<usize, ServoError> {
        // Starting angle and total change of each channel
        let mut moves = Vec::with_capacity(self.actions.len());
        for (channel, target) in self.actions.iter() {
            match actuator.get_angle(*channel) {
                Some(start) => moves.push((*channel, start, *target - start)),
                None => return Err(ServoError::UnknownChannel(*channel)),
            }
        }

        let max_delta = moves.iter().map(|m| m.2.abs()).fold(0.0, f64::max);
        let iterations = if self.max_deg_per_iter > 0.0 {
            (max_delta / self.max_deg_per_iter).ceil() as usize
        }
        else if max_delta > 0.0 {
            1
        }
        else {
            0
        };

        debug!(
            "MotionBatch [{}] max delta {:.1} iterations {}",
            self, max_delta, iterations
        );

        for i in 0..iterations {
            let last = i + 1 == iterations;

            for (channel, start, delta) in moves.iter() {
                let angle = if last {
                    start + delta
                }
                else {
                    start + delta * (i + 1) as f64 / iterations as f64
                };

                actuator.set_angle(*channel, angle)?;
            }

            if self.speed > 0.0 {
                thread::sleep(Duration::from_secs_f64(1.0 / self.speed));
            }
        }

        self.actions.clear();

        Ok(iterations)
    }
}

impl fmt::Display for MotionBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (channel, angle)) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.1}", channel, angle)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    /// Actuator recording every angle written to it.
    #[derive(Default)]
    struct Recorder {
        angles: HashMap<u8, f64>,
        writes: Vec<(u8, f64)>,
    }

    impl JointActuator for Recorder {
        fn has_channel(&self, channel: u8) -> bool {
            self.angles.contains_key(&channel)
        }

        fn get_angle(&self, channel: u8) -> Option<f64> {
            self.angles.get(&channel).copied()
        }

        fn set_angle(&mut self, channel: u8, angle_deg: f64) -> Result<(), ServoError> {
            self.angles.insert(channel, angle_deg);
            self.writes.push((channel, angle_deg));
            Ok(())
        }

        fn enroll(&mut self, _name: &str, channel: u8, _reversed: bool) {
            self.angles.entry(channel).or_insert(90.0);
        }
    }

    #[test]
    fn test_exec_interpolates_to_exact_targets() {
        let mut act = Recorder::default();
        act.angles.insert(1, 80.0);
        act.angles.insert(2, 80.0);

        let mut batch = MotionBatch::new(5.0, 0.0);
        batch.append(1, 90.0);
        batch.append(2, 100.0);

        assert_eq!(batch.exec(&mut act).unwrap(), 4);
        assert_eq!(act.angles[&1], 90.0);
        assert_eq!(act.angles[&2], 100.0);
        assert!(batch.is_empty());

        // Channel 2 moves the full 5 degrees each iteration, channel 1 half that
        let ch2: Vec<f64> = act.writes.iter().filter(|w| w.0 == 2).map(|w| w.1).collect();
        assert_eq!(ch2.len(), 4);
        assert!((ch2[0] - 85.0).abs() < 1e-9);
        assert!((ch2[2] - 95.0).abs() < 1e-9);
        let ch1: Vec<f64> = act.writes.iter().filter(|w| w.0 == 1).map(|w| w.1).collect();
        assert!((ch1[0] - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_append_upserts() {
        let mut batch = MotionBatch::new(5.0, 0.0);
        batch.append(3, 10.0);
        batch.append(4, 20.0);
        batch.append(3, 30.0);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(3), Some(30.0));
        assert_eq!(format!("{}", batch), "3: 30.0, 4: 20.0");
    }

    #[test]
    fn test_empty_and_zero_delta_are_noops() {
        let mut act = Recorder::default();
        act.angles.insert(1, 45.0);

        let mut batch = MotionBatch::new(5.0, 0.0);
        assert_eq!(batch.exec(&mut act).unwrap(), 0);

        batch.append(1, 45.0);
        assert_eq!(batch.exec(&mut act).unwrap(), 0);
        assert!(act.writes.is_empty());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_unknown_channel_writes_nothing() {
        let mut act = Recorder::default();
        act.angles.insert(1, 80.0);

        let mut batch = MotionBatch::new(5.0, 0.0);
        batch.append(1, 90.0);
        batch.append(9, 90.0);

        assert!(matches!(
            batch.exec(&mut act),
            Err(ServoError::UnknownChannel(9))
        ));
        assert!(act.writes.is_empty());
        assert!(!act.has_channel(9));
    }
}
