use serde::{Deserialize, Serialize};

use crate::error::ForestError;

/// Maximum number of thinnings or fertilizations that affect growth.
pub const MAX_TREATMENTS: usize = 5;

/// Largest single nitrogen application accepted, in pounds per acre.
pub const MAX_NITROGEN_LBS_PER_ACRE: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thinning {
    /// Period whose growth the thinning preceded.
    pub period: usize,
    /// Basal area removed (sq ft/acre).
    pub basal_area_removed: f64,
    /// Basal area immediately before the thinning (sq ft/acre).
    pub basal_area_before: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fertilization {
    /// Period at whose start nitrogen was applied.
    pub period: usize,
    pub nitrogen_lbs_per_acre: f64,
}

/// Thinning and fertilization events affecting growth, newest first.
///
/// Every recorded thinning is kept so that re-simulating from a later period
/// sees the same older harvests a fresh run would; only the newest
/// `MAX_TREATMENTS` are read back. Each trajectory owns its history and is its only writer; clones take an
/// independent copy, so concurrent candidate trajectories never share one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentHistory {
    thinnings: Vec<Thinning>,
    fertilizations: Vec<Fertilization>,
}

impl TreatmentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History with planned fertilizations, given in any order.
    pub fn with_fertilizations(mut fertilizations: Vec<Fertilization>) -> Result<Self, ForestError> {
        fertilizations.sort_by(|a, b| b.period.cmp(&a.period));
        let history = Self {
            thinnings: Vec::new(),
            fertilizations,
        };
        history.validate()?;
        Ok(history)
    }

    pub fn thinnings(&self) -> &[Thinning] {
        &self.thinnings
    }

    pub fn fertilizations(&self) -> &[Fertilization] {
        &self.fertilizations
    }

    /// The newest `MAX_TREATMENTS` thinnings applied by `period`, newest first.
    pub fn thinnings_as_of(&self, period: usize) -> impl Iterator<Item = &Thinning> {
        self.thinnings
            .iter()
            .filter(move |t| t.period <= period)
            .take(MAX_TREATMENTS)
    }

    /// Fertilizations already applied by `period`, newest first.
    pub fn fertilizations_as_of(&self, period: usize) -> impl Iterator<Item = &Fertilization> {
        self.fertilizations.iter().filter(move |f| f.period <= period)
    }

    /// Record a harvest at `period`.
    pub fn record_thinning(
        &mut self,
        period: usize,
        basal_area_removed: f64,
        basal_area_before: f64,
    ) -> Result<(), ForestError> {
        if let Some(latest) = self.thinnings.first() {
            if latest.period >= period {
                return Err(ForestError::InvariantViolation(format!(
                    "thinning at period {period} recorded after one at period {}",
                    latest.period
                )));
            }
        }
        if !(basal_area_removed > 0.0) || basal_area_removed > basal_area_before {
            return Err(ForestError::InvariantViolation(format!(
                "thinning removed {basal_area_removed} of {basal_area_before} sq ft/acre"
            )));
        }
        self.thinnings.insert(
            0,
            Thinning {
                period,
                basal_area_removed,
                basal_area_before,
            },
        );
        Ok(())
    }

    /// Forget thinnings at or after `period`, ahead of re-simulating from it.
    pub fn discard_thinnings_from(&mut self, period: usize) {
        self.thinnings.retain(|t| t.period < period);
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if self.fertilizations.len() > MAX_TREATMENTS {
            return Err(ForestError::StructuralInput(format!(
                "at most {MAX_TREATMENTS} fertilizations are supported"
            )));
        }
        if self.thinnings.windows(2).any(|w| w[0].period <= w[1].period) {
            return Err(ForestError::StructuralInput(
                "thinnings must occur in distinct periods, newest first".to_string(),
            ));
        }
        if self.fertilizations.windows(2).any(|w| w[0].period <= w[1].period) {
            return Err(ForestError::StructuralInput(
                "fertilizations must occur in distinct periods".to_string(),
            ));
        }
        for thin in &self.thinnings {
            if !(thin.basal_area_before > 0.0)
                || !(thin.basal_area_removed >= 0.0)
                || thin.basal_area_removed > thin.basal_area_before
            {
                return Err(ForestError::StructuralInput(format!(
                    "thinning at period {} removed {} of {} sq ft/acre",
                    thin.period, thin.basal_area_removed, thin.basal_area_before
                )));
            }
        }
        for fert in &self.fertilizations {
            if fert.period == 0 {
                return Err(ForestError::StructuralInput(
                    "fertilization cannot precede the first simulated period".to_string(),
                ));
            }
            if !(fert.nitrogen_lbs_per_acre > 0.0)
                || fert.nitrogen_lbs_per_acre > MAX_NITROGEN_LBS_PER_ACRE
            {
                return Err(ForestError::ConfigurationRange(format!(
                    "fertilization at period {} applies {} lb N/acre, expected 0..={}",
                    fert.period, fert.nitrogen_lbs_per_acre, MAX_NITROGEN_LBS_PER_ACRE
                )));
            }
        }
        Ok(())
    }
}
