use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ForestError;
use crate::growth::{Calibration, CalibrationState, GrowthPipeline, ModelVariant};
use crate::harvest::{HarvestPolicy, ThinningPrescription};
use crate::models::{Fertilization, Species, Stand, TreatmentHistory, VolumeEquation};
use crate::trajectory::{FinancialParameters, Trajectory, TrajectorySettings};

/// Calibration ratios for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesCalibration {
    pub species: Species,
    #[serde(flatten)]
    pub calibration: Calibration,
}

/// Everything needed to simulate a stand besides its trees.
///
/// ```toml
/// variant = "NWO"
/// periods = 10
/// genetic_gain = 5.0
///
/// [[calibration]]
/// species = "DF"
/// height = 1.0
/// diameter = 1.1
/// crown_ratio = 1.0
///
/// [[fertilization]]
/// period = 2
/// nitrogen_lbs_per_acre = 200.0
///
/// [[thinning]]
/// period = 3
/// from_below_percent = 30.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub variant: ModelVariant,
    pub periods: usize,
    #[serde(default)]
    pub genetic_gain: f64,
    /// Douglas-fir foliage retention (years) where Swiss needle cast is present.
    #[serde(default)]
    pub foliage_retention: Option<f64>,
    #[serde(default)]
    pub calibration: Vec<SpeciesCalibration>,
    #[serde(default)]
    pub fertilization: Vec<Fertilization>,
    #[serde(default)]
    pub thinning: Vec<ThinningPrescription>,
    #[serde(default)]
    pub volume: VolumeEquation,
    #[serde(default)]
    pub financial: FinancialParameters,
}

impl SimulationConfig {
    pub fn new(variant: ModelVariant, periods: usize) -> Self {
        Self {
            variant,
            periods,
            genetic_gain: 0.0,
            foliage_retention: None,
            calibration: Vec::new(),
            fertilization: Vec::new(),
            thinning: Vec::new(),
            volume: VolumeEquation::default(),
            financial: FinancialParameters::default(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ForestError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ForestError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, ForestError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&text),
            _ => Err(ForestError::ParseError(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    pub fn pipeline(&self) -> GrowthPipeline {
        GrowthPipeline {
            variant: self.variant,
            genetic_gain: self.genetic_gain,
            foliage_retention: self.foliage_retention,
        }
    }

    pub fn settings(&self) -> TrajectorySettings {
        TrajectorySettings {
            pipeline: self.pipeline(),
            volume: self.volume.clone(),
            periods: self.periods,
        }
    }

    pub fn calibration_state(&self) -> Result<CalibrationState, ForestError> {
        let mut state = CalibrationState::new();
        for entry in &self.calibration {
            if !self.variant.supports(entry.species) {
                return Err(ForestError::StructuralInput(format!(
                    "calibration given for {} which the {} variant does not grow",
                    entry.species, self.variant
                )));
            }
            state.set(entry.species, entry.calibration)?;
        }
        Ok(state)
    }

    pub fn treatment_history(&self) -> Result<TreatmentHistory, ForestError> {
        TreatmentHistory::with_fertilizations(self.fertilization.clone())
    }

    pub fn policies(&self) -> Vec<HarvestPolicy> {
        self.thinning
            .iter()
            .copied()
            .map(HarvestPolicy::Prescription)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        self.settings().validate()?;
        self.calibration_state()?;
        self.treatment_history()?;
        self.financial.validate()?;
        let mut periods: Vec<usize> = self.thinning.iter().map(|t| t.period).collect();
        periods.sort_unstable();
        if periods.windows(2).any(|w| w[0] == w[1]) {
            return Err(ForestError::ConfigurationRange(
                "at most one thinning may be scheduled per period".to_string(),
            ));
        }
        for rx in &self.thinning {
            HarvestPolicy::Prescription(*rx).validate()?;
            if rx.period > self.periods {
                return Err(ForestError::ConfigurationRange(format!(
                    "thinning at period {} is beyond the {}-period horizon",
                    rx.period, self.periods
                )));
            }
        }
        Ok(())
    }

    /// Trajectory for `stand` with every configured policy bound.
    pub fn build_trajectory(&self, stand: Stand) -> Result<Trajectory, ForestError> {
        self.validate()?;
        let mut trajectory = Trajectory::new(
            stand,
            self.settings(),
            self.calibration_state()?,
            self.treatment_history()?,
        )?;
        for policy in self.policies() {
            trajectory.add_policy(policy)?;
        }
        Ok(trajectory)
    }
}
