use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cohort::Trees;
use super::species::Species;
use super::tree::TreeRecord;
use super::volume::VolumeEquation;
use crate::error::ForestError;

/// Site indices (height in feet at 50 years breast height age).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteQuality {
    /// Douglas-fir site index; drives conifers other than hemlock/pine.
    pub primary_site_index: f64,
    /// Western hemlock (north) or ponderosa pine (south) site index.
    pub secondary_site_index: f64,
}

impl SiteQuality {
    pub fn validate(&self) -> Result<(), ForestError> {
        if !(20.0..=200.0).contains(&self.primary_site_index) {
            return Err(ForestError::ConfigurationRange(format!(
                "primary site index must be in 20..=200 ft, got {}",
                self.primary_site_index
            )));
        }
        if !(20.0..=160.0).contains(&self.secondary_site_index) {
            return Err(ForestError::ConfigurationRange(format!(
                "secondary site index must be in 20..=160 ft, got {}",
                self.secondary_site_index
            )));
        }
        Ok(())
    }
}

/// One snapshot of a stand: every species cohort at a given period.
///
/// Only built through [`Stand::from_records`]; stand files are read as
/// `io::StandFile` records so cohort storage is never taken on trust.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stand {
    /// Simulation period this snapshot describes (0 = initial conditions).
    pub period: usize,
    /// Stand age in years.
    pub age: f64,
    pub site: SiteQuality,
    cohorts: Vec<Trees>,
}

impl Stand {
    /// Build the initial snapshot from tree records.
    ///
    /// Trees are grouped by species into cohorts ordered by species ordinal;
    /// each cohort's arena is sized to exactly the records supplied.
    pub fn from_records(
        records: &[TreeRecord],
        site: SiteQuality,
        age: f64,
    ) -> Result<Self, ForestError> {
        site.validate()?;
        if !(age >= 0.0) {
            return Err(ForestError::StructuralInput(format!(
                "stand age must be non-negative, got {age}"
            )));
        }

        let mut by_species: BTreeMap<Species, Vec<&TreeRecord>> = BTreeMap::new();
        for record in records {
            by_species.entry(record.species).or_default().push(record);
        }

        let mut cohorts = Vec::with_capacity(by_species.len());
        for (species, members) in by_species {
            let mut trees = Trees::with_capacity(species, members.len());
            for record in members {
                trees.add(record)?;
            }
            cohorts.push(trees);
        }

        Ok(Self {
            period: 0,
            age,
            site,
            cohorts,
        })
    }

    pub fn cohorts(&self) -> &[Trees] {
        &self.cohorts
    }

    pub(crate) fn cohorts_mut(&mut self) -> &mut [Trees] {
        &mut self.cohorts
    }

    pub fn cohort(&self, species: Species) -> Option<&Trees> {
        self.cohorts.iter().find(|c| c.species() == species)
    }

    pub fn species(&self) -> Vec<Species> {
        self.cohorts.iter().map(|c| c.species()).collect()
    }

    /// Number of live tree records across all cohorts.
    pub fn num_trees(&self) -> usize {
        self.cohorts.iter().map(|c| c.len()).sum()
    }

    pub fn trees_per_acre(&self) -> f64 {
        self.cohorts.iter().map(|c| c.trees_per_acre()).sum()
    }

    /// Basal area per acre (sq ft/acre).
    pub fn basal_area(&self) -> f64 {
        self.cohorts.iter().map(|c| c.basal_area()).sum()
    }

    /// Quadratic mean diameter of live trees.
    pub fn quadratic_mean_diameter(&self) -> f64 {
        let tpa = self.trees_per_acre();
        if tpa <= 0.0 {
            return 0.0;
        }
        let sum_dbh_sq: f64 = self
            .cohorts
            .iter()
            .flat_map(|c| c.diameters().iter().zip(c.live_expansion_factors()))
            .map(|(&d, &ef)| d * d * ef)
            .sum();
        (sum_dbh_sq / tpa).sqrt()
    }

    /// Expansion-factor-weighted mean diameter of live trees.
    pub fn mean_diameter(&self) -> f64 {
        let tpa = self.trees_per_acre();
        if tpa <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = self
            .cohorts
            .iter()
            .flat_map(|c| c.diameters().iter().zip(c.live_expansion_factors()))
            .map(|(&d, &ef)| d * ef)
            .sum();
        weighted / tpa
    }

    /// Standing (cubic ft/acre, board ft/acre) under the given equation.
    pub fn standing_volume(&self, eq: &VolumeEquation) -> (f64, f64) {
        let mut cubic = 0.0;
        let mut board = 0.0;
        for cohort in &self.cohorts {
            for i in 0..cohort.len() {
                let ef = cohort.live_expansion_factor[i];
                cubic += eq.cubic_feet(cohort.diameter[i], cohort.height[i]) * ef;
                board += eq.board_feet(cohort.diameter[i], cohort.height[i]) * ef;
            }
        }
        (cubic, board)
    }

    /// Live trees as plain records, in cohort order.
    pub fn records(&self) -> Vec<TreeRecord> {
        self.cohorts
            .iter()
            .flat_map(|c| (0..c.len()).map(move |i| c.record(i)))
            .collect()
    }

    /// Compact every cohort, returning the total number of records dropped.
    pub fn compact(&mut self) -> Result<usize, ForestError> {
        let mut removed = 0;
        for cohort in &mut self.cohorts {
            removed += cohort.compact()?;
        }
        Ok(removed)
    }

    /// Overwrite this snapshot with `other` while reusing every cohort's storage.
    pub fn copy_from(&mut self, other: &Stand) -> Result<(), ForestError> {
        if self.cohorts.len() != other.cohorts.len() {
            return Err(ForestError::InvariantViolation(format!(
                "snapshot has {} cohorts, source has {}",
                self.cohorts.len(),
                other.cohorts.len()
            )));
        }
        for (mine, theirs) in self.cohorts.iter_mut().zip(&other.cohorts) {
            mine.copy_growth_from(theirs)?;
        }
        self.period = other.period;
        self.age = other.age;
        self.site = other.site;
        Ok(())
    }

    /// Structural validation of site and every live tree.
    pub fn validate(&self) -> Result<(), ForestError> {
        self.site.validate()?;
        for cohort in &self.cohorts {
            cohort.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteQuality {
        SiteQuality {
            primary_site_index: 120.0,
            secondary_site_index: 100.0,
        }
    }

    fn record(tag: u32, species: Species, dbh: f64, ef: f64) -> TreeRecord {
        TreeRecord {
            tag,
            species,
            dbh,
            height: 50.0 + 2.0 * dbh,
            crown_ratio: 0.5,
            expansion_factor: ef,
        }
    }

    fn mixed_stand() -> Stand {
        let records = vec![
            record(1, Species::WesternHemlock, 10.0, 20.0),
            record(2, Species::DouglasFir, 14.0, 10.0),
            record(3, Species::DouglasFir, 18.0, 10.0),
            record(4, Species::RedAlder, 8.0, 30.0),
        ];
        Stand::from_records(&records, site(), 30.0).unwrap()
    }

    #[test]
    fn test_cohorts_ordered_by_species_ordinal() {
        let stand = mixed_stand();
        assert_eq!(
            stand.species(),
            vec![Species::DouglasFir, Species::WesternHemlock, Species::RedAlder]
        );
        assert_eq!(stand.cohort(Species::DouglasFir).unwrap().capacity(), 2);
        assert_eq!(stand.num_trees(), 4);
    }

    #[test]
    fn test_trees_per_acre() {
        let stand = mixed_stand();
        assert!((stand.trees_per_acre() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_quadratic_mean_diameter_single_size() {
        let records = vec![
            record(1, Species::DouglasFir, 12.0, 5.0),
            record(2, Species::DouglasFir, 12.0, 5.0),
        ];
        let stand = Stand::from_records(&records, site(), 20.0).unwrap();
        assert!((stand.quadratic_mean_diameter() - 12.0).abs() < 1e-9);
        assert!((stand.mean_diameter() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stand_metrics() {
        let stand = Stand::from_records(&[], site(), 0.0).unwrap();
        assert_eq!(stand.trees_per_acre(), 0.0);
        assert_eq!(stand.quadratic_mean_diameter(), 0.0);
        assert_eq!(stand.basal_area(), 0.0);
    }

    #[test]
    fn test_from_records_rejects_bad_tree() {
        let mut bad = record(1, Species::DouglasFir, 12.0, 5.0);
        bad.crown_ratio = 1.2;
        let err = Stand::from_records(&[bad], site(), 10.0).unwrap_err();
        assert!(matches!(err, ForestError::StructuralInput(_)));
    }

    #[test]
    fn test_from_records_rejects_site_out_of_range() {
        let bad_site = SiteQuality {
            primary_site_index: 250.0,
            secondary_site_index: 100.0,
        };
        let err = Stand::from_records(&[], bad_site, 10.0).unwrap_err();
        assert!(matches!(err, ForestError::ConfigurationRange(_)));
    }

    #[test]
    fn test_standing_volume_positive() {
        let (cubic, board) = mixed_stand().standing_volume(&VolumeEquation::default());
        assert!(cubic > 0.0);
        assert!(board > 0.0);
    }

    #[test]
    fn test_copy_from_reuses_storage() {
        let original = mixed_stand();
        let mut target = original.clone();
        let mut grown = original.clone();
        grown.period = 3;
        grown.cohorts_mut()[0].diameter[0] = 15.5;
        target.copy_from(&grown).unwrap();
        assert_eq!(target, grown);
    }

    #[test]
    fn test_compact_across_cohorts() {
        let mut stand = mixed_stand();
        stand.cohorts_mut()[0].remove(0);
        stand.cohorts_mut()[2].remove(0);
        assert_eq!(stand.compact().unwrap(), 2);
        assert_eq!(stand.num_trees(), 2);
    }

    #[test]
    fn test_records_rebuild_the_same_stand() {
        let stand = mixed_stand();
        let back = Stand::from_records(&stand.records(), stand.site, stand.age).unwrap();
        assert_eq!(back, stand);
    }
}
