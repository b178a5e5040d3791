mod prescription;
mod selection;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ForestError;
use crate::growth::DensityProfile;
use crate::models::{basal_area_sqft, Stand, VolumeEquation};

pub use prescription::ThinningPrescription;
pub use selection::{RemovalSelection, TreeKey};

/// How the trees removed at one period are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HarvestPolicy {
    Prescription(ThinningPrescription),
    /// Remove whatever the caller scheduled for this period.
    ExternalSelection { period: usize },
}

/// Trees and volume taken by one harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestOutcome {
    pub period: usize,
    /// Removed trees, in the order they were selected.
    pub removed: Vec<TreeKey>,
    pub basal_area_before: f64,
    pub basal_area_removed: f64,
    pub trees_per_acre_removed: f64,
    pub cubic_volume_removed: f64,
    pub board_volume_removed: f64,
}

impl HarvestPolicy {
    pub fn period(&self) -> usize {
        match self {
            HarvestPolicy::Prescription(rx) => rx.period,
            HarvestPolicy::ExternalSelection { period } => *period,
        }
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if self.period() == 0 {
            return Err(ForestError::ConfigurationRange(
                "harvests cannot be scheduled at period 0".to_string(),
            ));
        }
        match self {
            HarvestPolicy::Prescription(rx) => rx.validate(),
            HarvestPolicy::ExternalSelection { .. } => Ok(()),
        }
    }

    /// Choose the trees to remove from `prior` and record them in
    /// `selection`. Running again on the same snapshot gives the same trees.
    pub fn select(
        &self,
        prior: &Stand,
        density: &DensityProfile,
        selection: &mut RemovalSelection,
    ) -> Result<Vec<TreeKey>, ForestError> {
        self.validate()?;
        match self {
            HarvestPolicy::Prescription(rx) => {
                let keys = rx.select(prior, density)?;
                selection.assign_period(rx.period, &keys)?;
                Ok(keys)
            }
            HarvestPolicy::ExternalSelection { period } => Ok(selection
                .selected_for(*period)
                .filter(|key| {
                    prior.cohorts().get(key.cohort).is_some_and(|trees| {
                        trees
                            .position_of(key.tree)
                            .is_some_and(|i| trees.live_expansion_factors()[i] > 0.0)
                    })
                })
                .collect()),
        }
    }
}

/// Remove `keys` from `stand` and compact it.
pub fn apply_harvest(
    stand: &mut Stand,
    period: usize,
    keys: &[TreeKey],
    volume: &VolumeEquation,
) -> Result<HarvestOutcome, ForestError> {
    let basal_area_before = stand.basal_area();
    let mut outcome = HarvestOutcome {
        period,
        removed: Vec::with_capacity(keys.len()),
        basal_area_before,
        basal_area_removed: 0.0,
        trees_per_acre_removed: 0.0,
        cubic_volume_removed: 0.0,
        board_volume_removed: 0.0,
    };

    for &key in keys {
        let trees = stand.cohorts_mut().get_mut(key.cohort).ok_or_else(|| {
            ForestError::InvariantViolation(format!("harvest references missing cohort {}", key.cohort))
        })?;
        let Some(i) = trees.position_of(key.tree) else {
            return Err(ForestError::InvariantViolation(format!(
                "harvest references tree {} no longer in cohort {}",
                key.tree, key.cohort
            )));
        };
        let (dbh, height) = (trees.diameter[i], trees.height[i]);
        let ef = trees.remove(i);
        if ef <= 0.0 {
            continue;
        }
        outcome.removed.push(key);
        outcome.basal_area_removed += basal_area_sqft(dbh) * ef;
        outcome.trees_per_acre_removed += ef;
        outcome.cubic_volume_removed += volume.cubic_feet(dbh, height) * ef;
        outcome.board_volume_removed += volume.board_feet(dbh, height) * ef;
    }
    stand.compact()?;

    debug!(
        period,
        trees = outcome.removed.len(),
        basal_area_removed = outcome.basal_area_removed,
        "applied harvest"
    );
    Ok(outcome)
}
