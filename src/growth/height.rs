use super::coefficients::{HeightGrowthCoefficients, SpeciesCoefficients};

/// Ceiling on growth-effective age (years).
pub const MAX_GROWTH_EFFECTIVE_AGE: f64 = 500.0;

/// Heights may not exceed the height-diameter curve by more than this factor.
const HEIGHT_DIAMETER_CAP: f64 = 1.5;

/// Feet of height above breast height allowed per inch of diameter.
const MAX_SLENDERNESS: f64 = 12.0;

/// Site index base age (years).
const BASE_AGE: f64 = 50.0;

/// Expected height (ft) for a given diameter.
pub fn height_diameter(c: &SpeciesCoefficients, dbh: f64) -> f64 {
    let [h0, h1, h2] = c.height_diameter;
    4.5 + (h0 + h1 * dbh.max(0.1).powf(h2)).exp()
}

/// Dominant height (ft) at `age` on a site of the given index.
pub fn site_height(hg: &HeightGrowthCoefficients, site_index: f64, age: f64) -> f64 {
    let scale = 1.0 - (-hg.rate * BASE_AGE).exp();
    let relative = (1.0 - (-hg.rate * age.max(0.0)).exp()) / scale;
    4.5 + (site_index - 4.5) * relative.powf(hg.shape)
}

/// Age at which the site curve reaches `height`, capped at
/// [`MAX_GROWTH_EFFECTIVE_AGE`].
pub fn growth_effective_age(hg: &HeightGrowthCoefficients, site_index: f64, height: f64) -> f64 {
    let relative = (height - 4.5) / (site_index - 4.5);
    if relative <= 0.0 {
        return 0.0;
    }
    let scale = 1.0 - (-hg.rate * BASE_AGE).exp();
    let x = relative.powf(1.0 / hg.shape) * scale;
    if x >= 1.0 {
        return MAX_GROWTH_EFFECTIVE_AGE;
    }
    (-(1.0 - x).ln() / hg.rate).min(MAX_GROWTH_EFFECTIVE_AGE)
}

/// Height growth (ft) on the primary path and the tree's growth-effective age.
///
/// Potential growth along the site curve is reduced by a short crown and by
/// crown closure at the tree's tip.
pub fn primary_height_growth(
    hg: &HeightGrowthCoefficients,
    site_index: f64,
    height: f64,
    crown_ratio: f64,
    closure_at_tip: f64,
    years: f64,
) -> (f64, f64) {
    let age = growth_effective_age(hg, site_index, height);
    let potential = site_height(hg, site_index, age + years) - site_height(hg, site_index, age);
    let [r0, r1, r2] = hg.crown_modifier;
    let modifier = ((1.0 - r0 * (1.0 - crown_ratio).powf(r1)) * (-r2 * closure_at_tip.max(0.0).sqrt()).exp())
        .clamp(0.0, 1.0);
    (potential.max(0.0) * modifier, age)
}

/// Height growth (ft) on the height-diameter ratio path.
pub fn secondary_height_growth(c: &SpeciesCoefficients, height: f64, dbh: f64, new_dbh: f64) -> f64 {
    height * (height_diameter(c, new_dbh) / height_diameter(c, dbh) - 1.0)
}

/// Clamp an increment so the new height respects both diameter-driven bounds.
/// Never negative.
pub fn bounded_increment(c: &SpeciesCoefficients, height: f64, new_dbh: f64, increment: f64) -> f64 {
    let curve_cap = height_diameter(c, new_dbh) * HEIGHT_DIAMETER_CAP;
    let slenderness_cap = 4.5 + MAX_SLENDERNESS * new_dbh;
    let ceiling = curve_cap.min(slenderness_cap);
    increment.min(ceiling - height).max(0.0)
}
