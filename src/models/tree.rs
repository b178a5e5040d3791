use serde::{Deserialize, Serialize};

use super::species::Species;
use crate::error::ForestError;

/// Basal area in square feet of a stem with the given diameter in inches.
#[inline]
pub fn basal_area_sqft(dbh: f64) -> f64 {
    std::f64::consts::PI * (dbh / 2.0).powi(2) / 144.0
}

/// A single tree measurement record supplied when a stand is initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// Caller-visible identifier carried through the whole trajectory
    pub tag: u32,
    pub species: Species,
    /// Diameter at breast height in inches
    pub dbh: f64,
    /// Total height in feet
    pub height: f64,
    /// Crown ratio (0.0 - 1.0)
    pub crown_ratio: f64,
    /// Number of trees per acre this record represents (expansion factor)
    pub expansion_factor: f64,
}

impl TreeRecord {
    /// Validate tree measurements. Returns `ForestError::StructuralInput` on failure.
    pub fn validate(&self) -> Result<(), ForestError> {
        validate_tree(
            self.tag,
            self.dbh,
            self.height,
            self.crown_ratio,
            self.expansion_factor,
        )
    }
}

/// Checks shared by tree records and cohort storage.
///
/// Height must exceed breast height because growth-effective age and the
/// crown-base equations take logarithms of `height - 4.5`.
pub(crate) fn validate_tree(
    tag: u32,
    dbh: f64,
    height: f64,
    crown_ratio: f64,
    expansion_factor: f64,
) -> Result<(), ForestError> {
    if !(dbh > 0.0) || !dbh.is_finite() {
        return Err(ForestError::StructuralInput(format!(
            "Tree {tag}: DBH must be positive, got {dbh}"
        )));
    }
    if !(height > 4.5) || !height.is_finite() {
        return Err(ForestError::StructuralInput(format!(
            "Tree {tag}: height must exceed breast height (4.5 ft), got {height}"
        )));
    }
    if !(0.0..=1.0).contains(&crown_ratio) {
        return Err(ForestError::StructuralInput(format!(
            "Tree {tag}: crown_ratio must be in 0.0..=1.0, got {crown_ratio}"
        )));
    }
    if !(expansion_factor >= 0.0) || !expansion_factor.is_finite() {
        return Err(ForestError::StructuralInput(format!(
            "Tree {tag}: expansion_factor must be non-negative, got {expansion_factor}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree(dbh: f64, height: f64, ef: f64) -> TreeRecord {
        TreeRecord {
            tag: 1,
            species: Species::DouglasFir,
            dbh,
            height,
            crown_ratio: 0.5,
            expansion_factor: ef,
        }
    }

    #[test]
    fn test_basal_area_12_inch_tree() {
        let tree = make_tree(12.0, 80.0, 5.0);
        // BA = pi * (12/2)^2 / 144 = pi * 36 / 144 = 0.7854
        assert!((basal_area_sqft(tree.dbh) - 0.7854).abs() < 0.001);
    }

    #[test]
    fn test_basal_area_large_tree() {
        // BA = pi * 18^2 / 144 = 7.069
        assert!((basal_area_sqft(36.0) - 7.069).abs() < 0.01);
    }

    #[test]
    fn test_validate_valid_tree() {
        assert!(make_tree(12.0, 80.0, 5.0).validate().is_ok());
    }

    #[test]
    fn test_validate_zero_dbh() {
        let err = make_tree(0.0, 80.0, 5.0).validate().unwrap_err();
        assert!(matches!(err, ForestError::StructuralInput(_)));
        assert!(err.to_string().contains("DBH must be positive"));
    }

    #[test]
    fn test_validate_nan_dbh() {
        assert!(make_tree(f64::NAN, 80.0, 5.0).validate().is_err());
    }

    #[test]
    fn test_validate_height_at_breast_height() {
        let err = make_tree(2.0, 4.5, 5.0).validate().unwrap_err();
        assert!(err.to_string().contains("breast height"));
    }

    #[test]
    fn test_validate_crown_ratio_bounds() {
        let mut tree = make_tree(12.0, 80.0, 5.0);
        tree.crown_ratio = 1.5;
        assert!(tree.validate().unwrap_err().to_string().contains("crown_ratio"));
        tree.crown_ratio = -0.1;
        assert!(tree.validate().is_err());
        tree.crown_ratio = 0.0;
        assert!(tree.validate().is_ok());
        tree.crown_ratio = 1.0;
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_validate_negative_expansion_factor() {
        let err = make_tree(12.0, 80.0, -1.0).validate().unwrap_err();
        assert!(err.to_string().contains("expansion_factor"));
    }

    #[test]
    fn test_tree_json_roundtrip() {
        let tree = make_tree(16.0, 100.0, 5.0);
        let json = serde_json::to_string(&tree).unwrap();
        let deserialized: TreeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, tree);
        assert!(json.contains("\"DF\""));
    }
}
