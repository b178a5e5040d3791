use super::coefficients::SpeciesCoefficients;

/// Live expansion factors below this are set to exactly zero.
pub const MIN_EXPANSION_FACTOR: f64 = 0.00001;

/// Probability a tree dies during the period.
///
/// `fertilization` is the fertilization intensity in effect; it only
/// raises the odds for species with a fertilization mortality term.
pub fn mortality_probability(
    c: &SpeciesCoefficients,
    dbh: f64,
    crown_ratio: f64,
    site_index: f64,
    basal_area_larger: f64,
    fertilization: f64,
) -> f64 {
    let [m0, m1, m2, m3, m4, m5] = c.mortality;
    let z = m0
        + m1 * dbh
        + m2 * dbh * dbh
        + m3 * crown_ratio
        + m4 * (site_index - 4.5)
        + m5 * basal_area_larger
        + c.fertilization_mortality * fertilization;
    1.0 / (1.0 + (-z).exp())
}

/// Extra survival penalty for trees with almost no live crown.
pub fn crown_ratio_adjustment(crown_ratio: f64) -> f64 {
    1.0 - (-(25.0 * crown_ratio).powi(2)).exp()
}

pub fn survival_probability(mortality: f64, crown_ratio: f64) -> f64 {
    (1.0 - mortality) * crown_ratio_adjustment(crown_ratio)
}

/// New live weight and the weight lost, after applying survival.
pub fn apply_survival(expansion_factor: f64, survival: f64) -> (f64, f64) {
    let mut live = expansion_factor * survival;
    if live < MIN_EXPANSION_FACTOR {
        live = 0.0;
    }
    (live, expansion_factor - live)
}
