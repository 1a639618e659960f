//! Simulated servo driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use super::{ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A driver with no hardware behind it, recording the last duty cycle of each channel.
///
/// Used when running off target and by the tests.
#[derive(Debug, Default)]
pub struct SimDriver {
    duties: HashMap<u8, f64>,
    num_writes: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDriver {
    /// The last duty cycle written to the channel.
    pub fn duty(&self, channel: u8) -> Option<f64> {
        self.duties.get(&channel).copied()
    }

    /// Total number of duty cycle writes.
    pub fn num_writes(&self) -> usize {
        self.num_writes
    }
}

impl ServoDriver for SimDriver {
    fn set_duty_cycle(&mut self, channel: u8, duty_cycle: f64) -> Result<(), ServoError> {
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ServoError::InvalidDutyCycle(duty_cycle));
        }

        self.duties.insert(channel, duty_cycle);
        self.num_writes += 1;

        Ok(())
    }
}
