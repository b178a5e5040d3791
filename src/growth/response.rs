//! Growth and mortality responses to thinning and fertilization.
//!
//! In both responses the most recent treatment sets the decay clock: its
//! elapsed time drives the time-decay term, while each older treatment is
//! discounted by its age relative to that most recent one.

use crate::models::TreatmentHistory;

/// Nitrogen rate (lb/acre) treated as one unit of fertilization.
const NITROGEN_UNIT: f64 = 800.0;

/// Upper bound on the relative basal area removed by thinning.
const MAX_RELATIVE_REMOVAL: f64 = 0.75;

/// Combined fertilization intensity in effect for `period`, before the
/// species-specific scale: `(N0/800 + Σ Ni/800 · exp(f2/f1 · Δti))^f1 · exp(f2 · t0)`.
/// Zero when no fertilization has been applied yet.
pub fn fertilization_intensity(
    response: &[f64; 3],
    history: &TreatmentHistory,
    period: usize,
    period_years: f64,
) -> f64 {
    let [_, f1, f2] = *response;
    let mut applied = history.fertilizations_as_of(period);
    let Some(latest) = applied.next() else {
        return 0.0;
    };
    let older: f64 = applied
        .map(|f| {
            let gap = (latest.period - f.period) as f64 * period_years;
            f.nitrogen_lbs_per_acre / NITROGEN_UNIT * ((f2 / f1) * gap).exp()
        })
        .sum();
    let elapsed = (period - latest.period) as f64 * period_years;
    (latest.nitrogen_lbs_per_acre / NITROGEN_UNIT + older).powf(f1) * (f2 * elapsed).exp()
}

/// Diameter growth multiplier from a fertilization intensity.
pub fn fertilization_adjustment(response: &[f64; 3], intensity: f64) -> f64 {
    1.0 + response[0] * intensity
}

/// Diameter growth multiplier from thinning: rises with the relative basal
/// area removed and decays with time since the most recent thinning.
pub fn thinning_adjustment(
    response: &[f64; 3],
    history: &TreatmentHistory,
    period: usize,
    period_years: f64,
) -> f64 {
    let [t0, t1, t2] = *response;
    let mut applied = history.thinnings_as_of(period);
    let Some(latest) = applied.next() else {
        return 1.0;
    };
    let older: f64 = applied
        .map(|t| {
            let gap = (latest.period - t.period) as f64 * period_years;
            t.basal_area_removed * ((t2 / t1) * gap).exp()
        })
        .sum();
    let removed = older + latest.basal_area_removed;
    let reference = older + latest.basal_area_before;
    if reference <= 0.0 {
        return 1.0;
    }
    let relative = (removed / reference).min(MAX_RELATIVE_REMOVAL);
    let elapsed = (period - latest.period) as f64 * period_years;
    1.0 + t0 * relative.powf(t1) * (t2 * elapsed).exp()
}

/// Douglas-fir diameter growth multiplier for improved planting stock.
pub fn genetic_gain_multiplier(gain_percent: f64) -> f64 {
    1.0 + gain_percent / 100.0
}

/// Douglas-fir diameter growth multiplier for Swiss needle cast, from years
/// of foliage retained. Healthy stands retain close to four years.
pub fn swiss_needle_cast_multiplier(foliage_retention_years: Option<f64>) -> f64 {
    match foliage_retention_years {
        Some(retention) => 1.0 - 0.2 * (-0.6 * (retention - 0.85)).exp(),
        None => 1.0,
    }
}
