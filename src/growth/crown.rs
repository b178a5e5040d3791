//! Crown geometry: maximum and largest crown width, crown closure by height
//! stratum, and height to crown base.

use super::coefficients::SpeciesCoefficients;
use super::variant::ModelVariant;
use crate::error::ForestError;
use crate::models::Stand;

/// Converts squared crown width (ft²) times trees per acre into percent of an acre.
pub const CROWN_AREA_FACTOR: f64 = 0.001803;

/// Height strata used for crown closure, including ground level and the top.
pub const CROWN_CLOSURE_STRATA: usize = 41;

/// Exponent describing crown taper between the crown base and the tip.
const CROWN_SHAPE: f64 = 0.7;

/// Open-grown crown width (ft). Non-decreasing in diameter.
pub fn max_crown_width(c: &SpeciesCoefficients, dbh: f64) -> f64 {
    let [a0, a1, a2, limit] = c.max_crown_width;
    let d = dbh.min(limit).max(0.0);
    (a0 + a1 * d + a2 * d * d).max(0.0)
}

/// Crown competition mass of a tree record: its contribution to CCF.
pub fn crown_competition(c: &SpeciesCoefficients, dbh: f64, expansion_factor: f64) -> f64 {
    let mcw = max_crown_width(c, dbh);
    CROWN_AREA_FACTOR * mcw * mcw * expansion_factor
}

/// Crown width at the crown base.
pub fn largest_crown_width(c: &SpeciesCoefficients, dbh: f64, crown_ratio: f64) -> f64 {
    max_crown_width(c, dbh) * crown_ratio.clamp(0.0, 1.0).powf(c.largest_crown_exponent)
}

/// Crown width of a tree at height `z` above ground.
pub fn crown_width_at(c: &SpeciesCoefficients, dbh: f64, height: f64, crown_ratio: f64, z: f64) -> f64 {
    if z >= height {
        return 0.0;
    }
    let lcw = largest_crown_width(c, dbh, crown_ratio);
    let crown_base = height * (1.0 - crown_ratio);
    if z <= crown_base {
        return lcw;
    }
    let relative = (height - z) / (height - crown_base);
    lcw * relative.powf(CROWN_SHAPE)
}

/// Height to crown base predicted from tree size and competition after growth.
pub fn height_to_crown_base(
    c: &SpeciesCoefficients,
    dbh: f64,
    height: f64,
    ccf_larger: f64,
    basal_area: f64,
    site_index: f64,
) -> f64 {
    let [c0, c1, c2, c3, c4, c5] = c.crown_base;
    let x = c0
        + c1 * height
        + c2 * ccf_larger
        + c3 * basal_area.max(1.0).ln()
        + c4 * (dbh / height)
        + c5 * (site_index - 4.5);
    height / (1.0 + x.exp())
}

/// Crown closure (percent of an acre) at evenly spaced heights from the
/// ground to the tallest tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CrownClosure {
    stratum_height: f64,
    closure: Vec<f64>,
}

impl CrownClosure {
    pub fn from_stand(stand: &Stand, variant: ModelVariant) -> Result<Self, ForestError> {
        let tallest = stand
            .cohorts()
            .iter()
            .flat_map(|c| c.heights().iter().copied())
            .fold(0.0_f64, f64::max);
        let stratum_height = tallest / (CROWN_CLOSURE_STRATA - 1) as f64;
        let mut closure = vec![0.0; CROWN_CLOSURE_STRATA];
        if tallest <= 0.0 {
            return Ok(Self {
                stratum_height,
                closure,
            });
        }

        for cohort in stand.cohorts() {
            let c = variant.coefficients(cohort.species())?;
            for i in 0..cohort.len() {
                let ef = cohort.live_expansion_factor[i];
                if ef <= 0.0 {
                    continue;
                }
                let (d, h, cr) = (cohort.diameter[i], cohort.height[i], cohort.crown_ratio[i]);
                for (s, value) in closure.iter_mut().enumerate() {
                    let z = s as f64 * stratum_height;
                    if z >= h {
                        break;
                    }
                    let cw = crown_width_at(c, d, h, cr, z);
                    *value += CROWN_AREA_FACTOR * cw * cw * ef;
                }
            }
        }
        Ok(Self {
            stratum_height,
            closure,
        })
    }

    /// Crown closure at height `z`, from the nearest stratum at or above it.
    pub fn at(&self, z: f64) -> f64 {
        if self.stratum_height <= 0.0 || z < 0.0 {
            return self.closure.first().copied().unwrap_or(0.0);
        }
        let stratum = (z / self.stratum_height).ceil() as usize;
        self.closure.get(stratum).copied().unwrap_or(0.0)
    }
}
