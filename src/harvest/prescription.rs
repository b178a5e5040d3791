use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::selection::TreeKey;
use crate::error::ForestError;
use crate::growth::DensityProfile;
use crate::models::{basal_area_sqft, Stand};

/// Thinning by basal-area percentages removed from above, from below and
/// proportionally, applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinningPrescription {
    pub period: usize,
    #[serde(default)]
    pub from_above_percent: f64,
    #[serde(default)]
    pub from_below_percent: f64,
    #[serde(default)]
    pub proportional_percent: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    key: TreeKey,
    dbh: f64,
    basal_area: f64,
}

impl ThinningPrescription {
    pub fn from_below(period: usize, percent: f64) -> Self {
        Self {
            period,
            from_above_percent: 0.0,
            from_below_percent: percent,
            proportional_percent: 0.0,
        }
    }

    pub fn from_above(period: usize, percent: f64) -> Self {
        Self {
            period,
            from_above_percent: percent,
            from_below_percent: 0.0,
            proportional_percent: 0.0,
        }
    }

    pub fn total_percent(&self) -> f64 {
        self.from_above_percent + self.from_below_percent + self.proportional_percent
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        for (name, value) in [
            ("from above", self.from_above_percent),
            ("from below", self.from_below_percent),
            ("proportional", self.proportional_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ForestError::ConfigurationRange(format!(
                    "{name} thinning at period {} must be in 0..=100 percent, got {value}",
                    self.period
                )));
            }
        }
        if self.total_percent() > 100.0 {
            return Err(ForestError::ConfigurationRange(format!(
                "thinning at period {} removes {}% of basal area",
                self.period,
                self.total_percent()
            )));
        }
        Ok(())
    }

    /// Trees to remove from `prior`, in removal order.
    pub fn select(&self, prior: &Stand, density: &DensityProfile) -> Result<Vec<TreeKey>, ForestError> {
        self.validate()?;

        let mut ascending: Vec<Candidate> = Vec::with_capacity(prior.num_trees());
        for (cohort, trees) in prior.cohorts().iter().enumerate() {
            for i in 0..trees.len() {
                let ef = trees.live_expansion_factors()[i];
                if ef <= 0.0 {
                    continue;
                }
                let dbh = trees.diameters()[i];
                ascending.push(Candidate {
                    key: TreeKey::new(cohort, trees.capacity_indices()[i]),
                    dbh,
                    basal_area: basal_area_sqft(dbh) * ef,
                });
            }
        }
        // ties go to the lowest species ordinal, then the lowest index
        ascending.sort_by(|a, b| a.dbh.total_cmp(&b.dbh).then(a.key.cmp(&b.key)));

        let total = density.total_basal_area();
        let mut removed = vec![false; ascending.len()];
        let mut order = Vec::new();

        let take = |idx: usize, removed: &mut [bool], order: &mut Vec<TreeKey>| {
            removed[idx] = true;
            order.push(ascending[idx].key);
            ascending[idx].basal_area
        };

        let above_target = total * self.from_above_percent / 100.0;
        let mut above: Vec<usize> = (0..ascending.len()).collect();
        above.sort_by(|&a, &b| {
            match ascending[b].dbh.total_cmp(&ascending[a].dbh) {
                Ordering::Equal => ascending[a].key.cmp(&ascending[b].key),
                other => other,
            }
        });
        let mut cut = 0.0;
        for idx in above {
            if cut >= above_target {
                break;
            }
            cut += take(idx, &mut removed, &mut order);
        }

        let below_target = total * self.from_below_percent / 100.0;
        let mut cut = 0.0;
        for idx in 0..ascending.len() {
            if cut >= below_target {
                break;
            }
            if !removed[idx] {
                cut += take(idx, &mut removed, &mut order);
            }
        }

        let remaining_percent = 100.0 - self.from_above_percent - self.from_below_percent;
        if self.proportional_percent > 0.0 && remaining_percent > 0.0 {
            let rate = self.proportional_percent / remaining_percent;
            let mut accumulator = 0.0;
            for idx in 0..ascending.len() {
                if removed[idx] {
                    continue;
                }
                accumulator += rate;
                if accumulator >= 1.0 {
                    take(idx, &mut removed, &mut order);
                    accumulator -= 1.0;
                }
            }
        }

        Ok(order)
    }
}
