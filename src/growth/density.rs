use super::crown::crown_competition;
use super::variant::ModelVariant;
use crate::error::ForestError;
use crate::models::{basal_area_sqft, Stand};

/// Diameter (in) below which bins are 0.1 in wide.
pub const FINE_LIMIT: f64 = 50.0;
/// Diameter (in) at and above which queries return zero.
pub const MAX_DIAMETER: f64 = 100.0;

const FINE_BINS: usize = 500;
const COARSE_BINS: usize = 50;
const BINS: usize = FINE_BINS + COARSE_BINS;

/// Stand density as a function of tree size.
///
/// Holds suffix sums of basal area (sq ft/acre) and crown competition factor
/// over diameter bins, so "how much is in trees at least this large" costs
/// one array lookup. Trees at or past [`MAX_DIAMETER`] accumulate into the
/// last bin.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityProfile {
    basal_area: Vec<f64>,
    competition: Vec<f64>,
}

fn bin_of(dbh: f64) -> Option<usize> {
    if !(dbh < MAX_DIAMETER) {
        return None;
    }
    if dbh < FINE_LIMIT {
        let bin = (dbh * 10.0).floor().max(0.0) as usize;
        Some(bin.min(FINE_BINS - 1))
    } else {
        let bin = FINE_BINS + (dbh - FINE_LIMIT).floor() as usize;
        Some(bin.min(BINS - 1))
    }
}

impl DensityProfile {
    /// Build from `(dbh, expansion factor, crown competition)` triples.
    pub fn from_trees(trees: impl IntoIterator<Item = (f64, f64, f64)>) -> Self {
        let mut basal_area = vec![0.0; BINS];
        let mut competition = vec![0.0; BINS];
        for (dbh, ef, ccf) in trees {
            let bin = bin_of(dbh).unwrap_or(BINS - 1);
            basal_area[bin] += basal_area_sqft(dbh) * ef;
            competition[bin] += ccf;
        }
        for bin in (0..BINS - 1).rev() {
            basal_area[bin] += basal_area[bin + 1];
            competition[bin] += competition[bin + 1];
        }
        Self {
            basal_area,
            competition,
        }
    }

    pub fn from_stand(stand: &Stand, variant: ModelVariant) -> Result<Self, ForestError> {
        let mut entries = Vec::with_capacity(stand.num_trees());
        for cohort in stand.cohorts() {
            let c = variant.coefficients(cohort.species())?;
            for (&d, &ef) in cohort.diameters().iter().zip(cohort.live_expansion_factors()) {
                entries.push((d, ef, crown_competition(c, d, ef)));
            }
        }
        Ok(Self::from_trees(entries))
    }

    /// Basal area (sq ft/acre) in trees whose diameter bin is at or above `dbh`'s.
    pub fn basal_area_larger_than(&self, dbh: f64) -> f64 {
        bin_of(dbh).map_or(0.0, |bin| self.basal_area[bin])
    }

    /// Crown competition factor in trees whose diameter bin is at or above `dbh`'s.
    pub fn competition_larger_than(&self, dbh: f64) -> f64 {
        bin_of(dbh).map_or(0.0, |bin| self.competition[bin])
    }

    pub fn total_basal_area(&self) -> f64 {
        self.basal_area[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_empty_profile_is_zero() {
        let profile = DensityProfile::from_trees(Vec::new());
        assert_eq!(profile.total_basal_area(), 0.0);
        assert_eq!(profile.competition_larger_than(10.0), 0.0);
    }

    #[test]
    fn test_single_tree() {
        let profile = DensityProfile::from_trees(vec![(12.05, 10.0, 3.0)]);
        let ba = basal_area_sqft(12.05) * 10.0;
        assert_approx_eq!(profile.total_basal_area(), ba, 1e-12);
        assert_approx_eq!(profile.basal_area_larger_than(12.0), ba, 1e-12);
        assert_eq!(profile.basal_area_larger_than(13.0), 0.0);
        assert_approx_eq!(profile.competition_larger_than(5.0), 3.0, 1e-12);
    }

    #[test]
    fn test_coarse_bins() {
        let profile = DensityProfile::from_trees(vec![(55.5, 1.0, 1.0), (72.2, 1.0, 1.0)]);
        assert_approx_eq!(profile.competition_larger_than(55.9), 2.0, 1e-12);
        assert_approx_eq!(profile.competition_larger_than(56.0), 1.0, 1e-12);
        assert_eq!(profile.competition_larger_than(73.0), 0.0);
    }

    #[test]
    fn test_giant_trees_land_in_last_bin() {
        let profile = DensityProfile::from_trees(vec![(140.0, 1.0, 4.0)]);
        assert_approx_eq!(profile.competition_larger_than(99.5), 4.0, 1e-12);
        assert_eq!(profile.competition_larger_than(100.0), 0.0);
        assert_eq!(profile.basal_area_larger_than(150.0), 0.0);
        assert_approx_eq!(profile.total_basal_area(), basal_area_sqft(140.0), 1e-9);
    }

    #[test]
    fn test_monotone_non_increasing() {
        let trees: Vec<(f64, f64, f64)> = (0..300)
            .map(|i| (1.0 + (i as f64 * 0.37) % 90.0, 3.0, 0.5))
            .collect();
        let profile = DensityProfile::from_trees(trees);
        let mut last = f64::INFINITY;
        for step in 0..1100 {
            let value = profile.basal_area_larger_than(step as f64 * 0.1);
            assert!(value <= last);
            last = value;
        }
    }
}
