use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::calibration::CalibrationState;
use super::crown::{height_to_crown_base, CrownClosure};
use super::density::DensityProfile;
use super::diameter::diameter_growth;
use super::height::{bounded_increment, primary_height_growth, secondary_height_growth};
use super::mortality::{apply_survival, mortality_probability, survival_probability};
use super::response::{
    fertilization_adjustment, fertilization_intensity, genetic_gain_multiplier,
    swiss_needle_cast_multiplier, thinning_adjustment,
};
use super::variant::ModelVariant;
use crate::error::ForestError;
use crate::models::{Stand, TreatmentHistory};

pub const MAX_GENETIC_GAIN: f64 = 20.0;
pub const MIN_FOLIAGE_RETENTION: f64 = 0.85;
pub const MAX_FOLIAGE_RETENTION: f64 = 7.0;

/// Share of primary trees past the variant's old-tree age that triggers a warning.
const OLD_TREE_WARNING_FRACTION: f64 = 0.2;

/// Advances a stand snapshot by one growth period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPipeline {
    pub variant: ModelVariant,
    /// Douglas-fir genetic gain (percent).
    #[serde(default)]
    pub genetic_gain: f64,
    /// Douglas-fir foliage retention (years) under Swiss needle cast.
    #[serde(default)]
    pub foliage_retention: Option<f64>,
}

/// What one period of growth produced besides the mutated stand.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthOutcome {
    /// Density of the grown stand.
    pub density: DensityProfile,
    pub primary_trees: usize,
    /// Primary trees whose growth-effective age exceeds the variant's old-tree age.
    pub old_trees: usize,
    /// Trees per acre lost to mortality.
    pub mortality: f64,
}

impl GrowthOutcome {
    pub fn old_tree_fraction(&self) -> f64 {
        if self.primary_trees == 0 {
            0.0
        } else {
            self.old_trees as f64 / self.primary_trees as f64
        }
    }
}

impl GrowthPipeline {
    pub fn new(variant: ModelVariant) -> Self {
        Self {
            variant,
            genetic_gain: 0.0,
            foliage_retention: None,
        }
    }

    pub fn with_genetic_gain(mut self, gain_percent: f64) -> Self {
        self.genetic_gain = gain_percent;
        self
    }

    pub fn with_foliage_retention(mut self, years: f64) -> Self {
        self.foliage_retention = Some(years);
        self
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if !(0.0..=MAX_GENETIC_GAIN).contains(&self.genetic_gain) {
            return Err(ForestError::ConfigurationRange(format!(
                "genetic gain must be in 0..={MAX_GENETIC_GAIN} percent, got {}",
                self.genetic_gain
            )));
        }
        if let Some(retention) = self.foliage_retention {
            if !(MIN_FOLIAGE_RETENTION..=MAX_FOLIAGE_RETENTION).contains(&retention) {
                return Err(ForestError::ConfigurationRange(format!(
                    "foliage retention must be in {MIN_FOLIAGE_RETENTION}..={MAX_FOLIAGE_RETENTION} years, got {retention}"
                )));
            }
        }
        Ok(())
    }

    /// Checks run before any tree is touched.
    pub fn validate_inputs(&self, stand: &Stand, treatments: &TreatmentHistory) -> Result<(), ForestError> {
        self.validate()?;
        self.variant.validate_stand(stand)?;
        treatments.validate()
    }

    /// Grow `stand` from its period to the next.
    ///
    /// `density` must describe `stand` as given. Diameter growth, height
    /// growth and mortality all read pre-growth state; crown ratios are then
    /// updated against the post-growth density, and calibration decays.
    pub fn grow(
        &self,
        stand: &mut Stand,
        density: &DensityProfile,
        calibration: &mut CalibrationState,
        treatments: &TreatmentHistory,
    ) -> Result<GrowthOutcome, ForestError> {
        self.validate_inputs(stand, treatments)?;

        let variant = self.variant;
        let years = variant.period_length_years();
        let period = stand.period + 1;
        let site = stand.site;
        let basal_area = density.total_basal_area();
        let closure = CrownClosure::from_stand(stand, variant)?;

        let mut primary_trees = 0;
        let mut old_trees = 0;
        let mut mortality = 0.0;
        let mut crown_bases = Vec::with_capacity(stand.cohorts().len());

        for cohort in stand.cohorts_mut() {
            let species = cohort.species();
            let c = variant.coefficients(species)?;
            let cal = calibration.get(species);
            let site_index = variant.site_index(c, &site);

            let fertilization =
                fertilization_intensity(&c.fertilization_response, treatments, period, years);
            let mut multiplier = cal.diameter
                * fertilization_adjustment(&c.fertilization_response, fertilization)
                * thinning_adjustment(&c.thinning_response, treatments, period, years);
            if variant.has_douglas_fir_modifiers(species) {
                multiplier *= genetic_gain_multiplier(self.genetic_gain)
                    * swiss_needle_cast_multiplier(self.foliage_retention);
            }
            let mortality_fertilization = if c.height_growth.is_some() {
                fertilization
            } else {
                0.0
            };

            let mut bases = Vec::with_capacity(cohort.len());
            for i in 0..cohort.len() {
                let d = cohort.diameter[i];
                let h = cohort.height[i];
                let cr = cohort.crown_ratio[i];
                bases.push(h * (1.0 - cr));

                let bal = density.basal_area_larger_than(d);
                let new_d = d + diameter_growth(c, d, cr, site_index, bal, basal_area) * multiplier;

                let raw = match &c.height_growth {
                    Some(hg) => {
                        let (growth, age) =
                            primary_height_growth(hg, site_index, h, cr, closure.at(h), years);
                        primary_trees += 1;
                        if age > variant.old_tree_age() {
                            old_trees += 1;
                        }
                        growth
                    }
                    None => secondary_height_growth(c, h, d, new_d),
                };
                let increment = bounded_increment(c, h, new_d, raw * cal.height);

                let pm = mortality_probability(c, d, cr, site_index, bal, mortality_fertilization);
                let survival = survival_probability(pm, cr);
                if !(0.0..=1.0).contains(&survival) {
                    return Err(ForestError::InvariantViolation(format!(
                        "{species} tree {}: survival probability {survival}",
                        cohort.tag[i]
                    )));
                }
                let (live, dead) = apply_survival(cohort.live_expansion_factor[i], survival);

                cohort.diameter[i] = new_d;
                cohort.height[i] = h + increment;
                cohort.live_expansion_factor[i] = live;
                cohort.dead_expansion_factor[i] = dead;
                mortality += dead;
            }
            crown_bases.push(bases);
        }

        stand.period = period;
        stand.age += years;
        let after = DensityProfile::from_stand(stand, variant)?;
        self.recede_crowns(stand, &after, &crown_bases, calibration)?;
        calibration.decay();

        let outcome = GrowthOutcome {
            density: after,
            primary_trees,
            old_trees,
            mortality,
        };
        if outcome.old_tree_fraction() > OLD_TREE_WARNING_FRACTION {
            warn!(
                period,
                old_trees,
                primary_trees,
                "more than {:.0}% of primary trees are past the {} year growth-effective age limit",
                OLD_TREE_WARNING_FRACTION * 100.0,
                variant.old_tree_age()
            );
        }
        debug!(
            period,
            trees = stand.num_trees(),
            basal_area = outcome.density.total_basal_area(),
            mortality,
            "grew stand"
        );
        Ok(outcome)
    }

    /// Move crown bases up toward the prediction from post-growth density.
    /// A crown base never drops.
    fn recede_crowns(
        &self,
        stand: &mut Stand,
        density: &DensityProfile,
        previous_bases: &[Vec<f64>],
        calibration: &CalibrationState,
    ) -> Result<(), ForestError> {
        let site = stand.site;
        let basal_area = density.total_basal_area();
        for (cohort, bases) in stand.cohorts_mut().iter_mut().zip(previous_bases) {
            let species = cohort.species();
            let c = self.variant.coefficients(species)?;
            let cal = calibration.get(species);
            let site_index = self.variant.site_index(c, &site);

            for (i, &old_base) in bases.iter().enumerate() {
                let d = cohort.diameter[i];
                let h = cohort.height[i];
                let ccf_larger = density.competition_larger_than(d);
                let modeled = height_to_crown_base(c, d, h, ccf_larger, basal_area, site_index);
                let ratio = ((1.0 - modeled / h) * cal.crown_ratio).clamp(0.0, 1.0);
                let predicted = h * (1.0 - ratio);

                let base = if predicted > old_base {
                    predicted.min(c.max_crown_base_ratio * h).max(old_base)
                } else {
                    old_base
                };
                if base > h {
                    return Err(ForestError::InvariantViolation(format!(
                        "{species} tree {}: crown base {base:.2} ft above height {h:.2} ft",
                        cohort.tag[i]
                    )));
                }
                cohort.crown_ratio[i] = 1.0 - base / h;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::Calibration;
    use crate::models::{Fertilization, SiteQuality, Species, TreeRecord};

    fn site() -> SiteQuality {
        SiteQuality {
            primary_site_index: 120.0,
            secondary_site_index: 100.0,
        }
    }

    fn stand_of(species: Species, n: u32) -> Stand {
        let records: Vec<TreeRecord> = (0..n)
            .map(|i| TreeRecord {
                tag: i,
                species,
                dbh: 6.0 + (i % 15) as f64,
                height: 45.0 + 2.5 * (i % 15) as f64,
                crown_ratio: 0.45,
                expansion_factor: 4.0,
            })
            .collect();
        Stand::from_records(&records, site(), 30.0).unwrap()
    }

    fn grow_once(pipeline: &GrowthPipeline, stand: &mut Stand, treatments: &TreatmentHistory) -> GrowthOutcome {
        let density = DensityProfile::from_stand(stand, pipeline.variant).unwrap();
        let mut calibration = CalibrationState::new();
        pipeline
            .grow(stand, &density, &mut calibration, treatments)
            .unwrap()
    }

    #[test]
    fn test_grow_advances_period_and_sizes() {
        let pipeline = GrowthPipeline::new(ModelVariant::Nwo);
        let mut stand = stand_of(Species::DouglasFir, 60);
        let before = stand.clone();
        let outcome = grow_once(&pipeline, &mut stand, &TreatmentHistory::new());

        assert_eq!(stand.period, 1);
        assert_eq!(stand.age, 35.0);
        assert_eq!(outcome.primary_trees, 60);
        let old = before.cohort(Species::DouglasFir).unwrap();
        let new = stand.cohort(Species::DouglasFir).unwrap();
        for i in 0..old.len() {
            assert!(new.diameters()[i] > old.diameters()[i]);
            assert!(new.heights()[i] >= old.heights()[i]);
            assert!(new.live_expansion_factors()[i] <= old.live_expansion_factors()[i]);
            let old_base = old.heights()[i] * (1.0 - old.crown_ratios()[i]);
            let new_base = new.heights()[i] * (1.0 - new.crown_ratios()[i]);
            assert!(new_base >= old_base - 1e-9);
        }
    }

    #[test]
    fn test_dead_weight_matches_loss() {
        let pipeline = GrowthPipeline::new(ModelVariant::Nwo);
        let mut stand = stand_of(Species::WesternRedcedar, 40);
        let tpa_before = stand.trees_per_acre();
        let outcome = grow_once(&pipeline, &mut stand, &TreatmentHistory::new());
        let cohort = stand.cohort(Species::WesternRedcedar).unwrap();
        let dead: f64 = cohort.dead_expansion_factors().iter().sum();
        assert!((tpa_before - stand.trees_per_acre() - dead).abs() < 1e-9);
        assert!((outcome.mortality - dead).abs() < 1e-9);
        assert_eq!(outcome.primary_trees, 0);
    }

    #[test]
    fn test_returned_density_matches_grown_stand() {
        let pipeline = GrowthPipeline::new(ModelVariant::Swo);
        let mut stand = stand_of(Species::PonderosaPine, 30);
        let outcome = grow_once(&pipeline, &mut stand, &TreatmentHistory::new());
        let rebuilt = DensityProfile::from_stand(&stand, ModelVariant::Swo).unwrap();
        assert_eq!(outcome.density, rebuilt);
    }

    #[test]
    fn test_genetic_gain_speeds_douglas_fir() {
        let mut plain = stand_of(Species::DouglasFir, 20);
        let mut improved = plain.clone();
        grow_once(&GrowthPipeline::new(ModelVariant::Nwo), &mut plain, &TreatmentHistory::new());
        grow_once(
            &GrowthPipeline::new(ModelVariant::Nwo).with_genetic_gain(15.0),
            &mut improved,
            &TreatmentHistory::new(),
        );
        assert!(improved.basal_area() > plain.basal_area());
    }

    #[test]
    fn test_fertilization_speeds_diameter_growth() {
        let mut plain = stand_of(Species::DouglasFir, 20);
        let mut fertilized = plain.clone();
        let history = TreatmentHistory::with_fertilizations(vec![Fertilization {
            period: 1,
            nitrogen_lbs_per_acre: 200.0,
        }])
        .unwrap();
        let pipeline = GrowthPipeline::new(ModelVariant::Nwo);
        grow_once(&pipeline, &mut plain, &TreatmentHistory::new());
        grow_once(&pipeline, &mut fertilized, &history);
        let d_plain = plain.cohorts()[0].diameters()[0];
        let d_fert = fertilized.cohorts()[0].diameters()[0];
        assert!(d_fert > d_plain);
    }

    #[test]
    fn test_calibration_decays_after_growth() {
        let pipeline = GrowthPipeline::new(ModelVariant::Nwo);
        let mut stand = stand_of(Species::DouglasFir, 10);
        let density = DensityProfile::from_stand(&stand, ModelVariant::Nwo).unwrap();
        let mut calibration = CalibrationState::new();
        calibration
            .set(
                Species::DouglasFir,
                Calibration {
                    height: 1.0,
                    diameter: 1.5,
                    crown_ratio: 1.0,
                },
            )
            .unwrap();
        pipeline
            .grow(&mut stand, &density, &mut calibration, &TreatmentHistory::new())
            .unwrap();
        assert!((calibration.get(Species::DouglasFir).diameter - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_validation_runs_before_mutation() {
        let pipeline = GrowthPipeline::new(ModelVariant::Swo);
        let mut stand = stand_of(Species::RedAlder, 5);
        let before = stand.clone();
        let density = DensityProfile::from_trees(Vec::new());
        let err = pipeline
            .grow(&mut stand, &density, &mut CalibrationState::new(), &TreatmentHistory::new())
            .unwrap_err();
        assert!(matches!(err, ForestError::StructuralInput(_)));
        assert_eq!(stand, before);
    }

    #[test]
    fn test_pipeline_range_checks() {
        let err = GrowthPipeline::new(ModelVariant::Nwo)
            .with_genetic_gain(25.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ForestError::ConfigurationRange(_)));
        assert!(GrowthPipeline::new(ModelVariant::Nwo)
            .with_foliage_retention(0.5)
            .validate()
            .is_err());
    }
}
