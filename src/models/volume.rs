use serde::{Deserialize, Serialize};

/// Configurable volume equation coefficients.
///
/// Cubic foot volume: `V = cuft_b1 * DBH^2 * H`
/// Board foot volume (Scribner): `V = bdft_b1 * DBH^2 * H - bdft_b2 * DBH`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeEquation {
    /// Coefficient for cubic foot volume: V = cuft_b1 * DBH^2 * H
    pub cuft_b1: f64,
    /// Coefficient for board foot volume: V = bdft_b1 * DBH^2 * H - bdft_b2 * DBH
    pub bdft_b1: f64,
    /// Second coefficient for board foot volume
    pub bdft_b2: f64,
    /// Minimum DBH for board foot merchantability
    pub bdft_min_dbh: f64,
}

impl Default for VolumeEquation {
    fn default() -> Self {
        Self {
            cuft_b1: 0.002454,
            bdft_b1: 0.01159,
            bdft_b2: 4.0,
            bdft_min_dbh: 6.0,
        }
    }
}

impl VolumeEquation {
    /// Cubic feet in one stem.
    pub fn cubic_feet(&self, dbh: f64, height: f64) -> f64 {
        if dbh <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        self.cuft_b1 * dbh.powi(2) * height
    }

    /// Scribner board feet in one stem; zero below merchantable diameter.
    pub fn board_feet(&self, dbh: f64, height: f64) -> f64 {
        if dbh < self.bdft_min_dbh || height <= 0.0 {
            return 0.0;
        }
        (self.bdft_b1 * dbh.powi(2) * height - self.bdft_b2 * dbh).max(0.0)
    }
}
