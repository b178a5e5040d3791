use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ForestError;
use crate::models::Species;

pub const MIN_CALIBRATION: f64 = 0.5;
pub const MAX_CALIBRATION: f64 = 2.0;

/// Multipliers fitted to local growth data for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub height: f64,
    pub diameter: f64,
    pub crown_ratio: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            height: 1.0,
            diameter: 1.0,
            crown_ratio: 1.0,
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> Result<(), ForestError> {
        for (name, value) in [
            ("height", self.height),
            ("diameter", self.diameter),
            ("crown ratio", self.crown_ratio),
        ] {
            if !(MIN_CALIBRATION..=MAX_CALIBRATION).contains(&value) {
                return Err(ForestError::ConfigurationRange(format!(
                    "{name} calibration must be in {MIN_CALIBRATION}..={MAX_CALIBRATION}, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Move every multiplier halfway back toward 1.
    pub fn decay(&mut self) {
        self.height = (1.0 + self.height) / 2.0;
        self.diameter = (1.0 + self.diameter) / 2.0;
        self.crown_ratio = (1.0 + self.crown_ratio) / 2.0;
    }
}

/// Calibration in effect for each species at one period. Species without an
/// entry are uncalibrated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationState {
    by_species: BTreeMap<Species, Calibration>,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, species: Species) -> Calibration {
        self.by_species.get(&species).copied().unwrap_or_default()
    }

    pub fn set(&mut self, species: Species, calibration: Calibration) -> Result<(), ForestError> {
        calibration.validate()?;
        self.by_species.insert(species, calibration);
        Ok(())
    }

    pub fn decay(&mut self) {
        for calibration in self.by_species.values_mut() {
            calibration.decay();
        }
    }
}
