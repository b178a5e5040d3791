use serde::{Deserialize, Serialize};

use crate::error::ForestError;
use crate::growth::GrowthOutcome;
use crate::harvest::HarvestOutcome;
use crate::models::{Stand, VolumeEquation};

/// Stand aggregates at the end of one period, plus what was harvested at
/// its start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodYield {
    pub period: usize,
    pub age: f64,
    pub trees_per_acre: f64,
    pub basal_area: f64,
    pub quadratic_mean_diameter: f64,
    pub standing_cubic_volume: f64,
    pub standing_board_volume: f64,
    pub trees_per_acre_removed: f64,
    pub basal_area_removed: f64,
    pub harvested_cubic_volume: f64,
    pub harvested_board_volume: f64,
    /// Trees per acre lost to mortality during the period.
    pub mortality: f64,
    pub old_trees: usize,
}

impl PeriodYield {
    pub fn from_stand(
        stand: &Stand,
        volume: &VolumeEquation,
        harvest: Option<&HarvestOutcome>,
        growth: Option<&GrowthOutcome>,
    ) -> Self {
        let (standing_cubic_volume, standing_board_volume) = stand.standing_volume(volume);
        Self {
            period: stand.period,
            age: stand.age,
            trees_per_acre: stand.trees_per_acre(),
            basal_area: stand.basal_area(),
            quadratic_mean_diameter: stand.quadratic_mean_diameter(),
            standing_cubic_volume,
            standing_board_volume,
            trees_per_acre_removed: harvest.map_or(0.0, |h| h.trees_per_acre_removed),
            basal_area_removed: harvest.map_or(0.0, |h| h.basal_area_removed),
            harvested_cubic_volume: harvest.map_or(0.0, |h| h.cubic_volume_removed),
            harvested_board_volume: harvest.map_or(0.0, |h| h.board_volume_removed),
            mortality: growth.map_or(0.0, |g| g.mortality),
            old_trees: growth.map_or(0, |g| g.old_trees),
        }
    }
}

/// Stumpage value and discounting used to value a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialParameters {
    /// Annual real discount rate, as a fraction.
    pub discount_rate: f64,
    /// Dollars per thousand board feet.
    pub price_per_mbf: f64,
    /// Value standing timber at the end of the horizon as if clearcut.
    pub include_final_standing: bool,
}

impl Default for FinancialParameters {
    fn default() -> Self {
        Self {
            discount_rate: 0.05,
            price_per_mbf: 500.0,
            include_final_standing: true,
        }
    }
}

impl FinancialParameters {
    pub fn validate(&self) -> Result<(), ForestError> {
        if !(0.0..1.0).contains(&self.discount_rate) {
            return Err(ForestError::ConfigurationRange(format!(
                "discount rate must be in 0..1, got {}",
                self.discount_rate
            )));
        }
        if !(self.price_per_mbf >= 0.0) {
            return Err(ForestError::ConfigurationRange(format!(
                "price per MBF must be non-negative, got {}",
                self.price_per_mbf
            )));
        }
        Ok(())
    }
}

/// Totals over a fully simulated horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub periods: usize,
    pub harvest_periods: Vec<usize>,
    pub total_basal_area_removed: f64,
    pub total_harvested_cubic_volume: f64,
    pub total_harvested_board_volume: f64,
    pub final_standing_board_volume: f64,
    pub final_trees_per_acre: f64,
}

impl TrajectorySummary {
    pub fn from_yields(yields: &[PeriodYield]) -> Self {
        let last = yields.last();
        Self {
            periods: last.map_or(0, |y| y.period),
            harvest_periods: yields
                .iter()
                .filter(|y| y.trees_per_acre_removed > 0.0)
                .map(|y| y.period)
                .collect(),
            total_basal_area_removed: yields.iter().map(|y| y.basal_area_removed).sum(),
            total_harvested_cubic_volume: yields.iter().map(|y| y.harvested_cubic_volume).sum(),
            total_harvested_board_volume: yields.iter().map(|y| y.harvested_board_volume).sum(),
            final_standing_board_volume: last.map_or(0.0, |y| y.standing_board_volume),
            final_trees_per_acre: last.map_or(0.0, |y| y.trees_per_acre),
        }
    }
}

/// Present value of harvests, each taken at the start of its period, and
/// optionally of the standing volume at the end of the last period.
pub fn net_present_value(yields: &[PeriodYield], period_years: f64, params: &FinancialParameters) -> f64 {
    let discount = |years: f64| (1.0 + params.discount_rate).powf(-years);
    let value = |board_feet: f64| board_feet / 1000.0 * params.price_per_mbf;

    let mut npv: f64 = yields
        .iter()
        .filter(|y| y.period > 0 && y.harvested_board_volume > 0.0)
        .map(|y| value(y.harvested_board_volume) * discount((y.period - 1) as f64 * period_years))
        .sum();
    if params.include_final_standing {
        if let Some(last) = yields.last() {
            npv += value(last.standing_board_volume) * discount(last.period as f64 * period_years);
        }
    }
    npv
}
