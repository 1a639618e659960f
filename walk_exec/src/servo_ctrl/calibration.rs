//! Calibration persistence
//!
//! The calibration of a servo is the deviation of its current position from the neutral pose plus
//! any existing offset. The operator jogs each joint until the leg is physically neutral and then
//! saves, which captures the offsets needed to make 90 degrees mean neutral.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;

use super::{ServoCtrl, ServoDriver, ServoError, NEUTRAL_ANGLE_DEG};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D> ServoCtrl<D>
where
    D: ServoDriver,
{
    /// The calibration map which would be saved now.
    pub fn calibration(&self) -> BTreeMap<u8, f64> {
        self.servos()
            .map(|s| (s.channel, s.position - NEUTRAL_ANGLE_DEG + s.calibration))
            .collect()
    }

    /// Save the calibration of every enrolled servo as JSON.
    pub fn save_calibration<P: AsRef<Path>>(&self, path: P) -> Result<(), ServoError> {
        let mut json = serde_json::to_string(&self.calibration())?;
        json.push('\n');

        fs::write(path.as_ref(), json)?;

        info!("Calibration saved to {:?}", path.as_ref());

        Ok(())
    }

    /// Load calibration offsets from a JSON file, enrolling any unknown channels.
    pub fn load_calibration<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ServoError> {
        let json = fs::read_to_string(path.as_ref())?;
        let offsets: BTreeMap<u8, f64> = serde_json::from_str(&json)?;

        for (channel, offset) in offsets.iter() {
            self.set_calibration(*channel, *offset);
        }

        info!(
            "Loaded calibration for {} channels from {:?}",
            offsets.len(),
            path.as_ref()
        );

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::super::{JointActuator, ServoParams, SimDriver};
    use super::*;

    #[test]
    fn test_calibration_round_trip() {
        let mut sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        sc.enroll("a", 3, false);
        sc.enroll("b", 12, true);
        sc.set_angle(3, 95.0).unwrap();
        sc.set_angle(12, 88.5).unwrap();

        let path = std::env::temp_dir().join(format!(
            "walk_exec_calib_test_{}.json",
            std::process::id()
        ));
        sc.save_calibration(&path).unwrap();

        let mut loaded = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        loaded.load_calibration(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!((loaded.get(3).unwrap().calibration - 5.0).abs() < 1e-12);
        assert!((loaded.get(12).unwrap().calibration + 1.5).abs() < 1e-12);

        // Loaded servos start at neutral
        assert_eq!(loaded.get_angle(3), Some(NEUTRAL_ANGLE_DEG));
    }

    #[test]
    fn test_load_missing_file() {
        let mut sc = ServoCtrl::new(SimDriver::default(), ServoParams::default());
        assert!(matches!(
            sc.load_calibration("/nonexistent/calib.json"),
            Err(ServoError::Io(_))
        ));
    }
}
