use super::coefficients::SpeciesCoefficients;

/// Unadjusted diameter increment (in) over one period.
///
/// `basal_area_larger` is the basal area in trees at or above this tree's
/// size; `basal_area` is total stand basal area, both before growth.
pub fn diameter_growth(
    c: &SpeciesCoefficients,
    dbh: f64,
    crown_ratio: f64,
    site_index: f64,
    basal_area_larger: f64,
    basal_area: f64,
) -> f64 {
    let [b0, b1, b2, b3, b4, b5, b6] = c.diameter_growth;
    let ln_size = (dbh + 5.0).ln();
    let ln_dg = b0
        + b1 * ln_size
        + b2 * dbh * dbh
        + b3 * ((crown_ratio + 0.2) / 1.2).ln()
        + b4 * (site_index - 4.5).ln()
        + b5 * basal_area_larger * basal_area_larger / ln_size
        + b6 * basal_area.max(0.0).sqrt();
    ln_dg.exp()
}
