//! Per-species coefficient tables for each model variant.
//!
//! Equation forms (D = DBH in inches, H = height in feet, CR = crown ratio,
//! SI = site index, BAL = basal area in larger trees, BA = stand basal area,
//! CCFL = crown competition factor in larger trees):
//!
//! - diameter growth: `exp(b0 + b1 ln(D+5) + b2 D² + b3 ln((CR+0.2)/1.2)
//!   + b4 ln(SI-4.5) + b5 BAL²/ln(D+5) + b6 √BA)`
//! - height-diameter: `4.5 + exp(h0 + h1 D^h2)`
//! - height to crown base: `H / (1 + exp(c0 + c1 H + c2 CCFL + c3 ln BA + c4 D/H + c5 (SI-4.5)))`
//! - maximum crown width: `a0 + a1 D' + a2 D'²` with `D' = min(D, a3)`
//! - mortality logit: `m0 + m1 D + m2 D² + m3 CR + m4 (SI-4.5) + m5 BAL`
//! - thinning response: `1 + t0 PREM^t1 exp(t2 years)`
//! - fertilization response: `1 + f0 intensity^f1 exp(f2 years)`

use crate::models::Species;

/// Which site index drives a species' growth equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteCurve {
    Primary,
    Secondary,
}

/// Potential height growth parameters for primary species.
///
/// Site curve: `H(A) = 4.5 + (SI-4.5) ((1 - e^(-k A)) / (1 - e^(-50 k)))^p`.
/// Modifier: `(1 - r0 (1-CR)^r1) exp(-r2 √CCH)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightGrowthCoefficients {
    pub rate: f64,
    pub shape: f64,
    pub crown_modifier: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesCoefficients {
    pub site_curve: SiteCurve,
    pub diameter_growth: [f64; 7],
    pub height_diameter: [f64; 3],
    pub crown_base: [f64; 6],
    pub max_crown_width: [f64; 4],
    /// Exponent on crown ratio scaling maximum to largest crown width.
    pub largest_crown_exponent: f64,
    pub mortality: [f64; 6],
    /// Crown base may recede to at most this fraction of total height.
    pub max_crown_base_ratio: f64,
    pub thinning_response: [f64; 3],
    pub fertilization_response: [f64; 3],
    /// Added to the mortality logit per unit of fertilization intensity.
    pub fertilization_mortality: f64,
    /// `Some` for species on the primary height-growth path.
    pub height_growth: Option<HeightGrowthCoefficients>,
}

const CONIFER_THINNING: [f64; 3] = [0.6203, 1.0, -0.2644];
const HARDWOOD_THINNING: [f64; 3] = [0.4, 1.0, -0.3];
const NO_FERTILIZATION: [f64; 3] = [0.0, 1.0, 0.0];

// northwest Oregon

const DF_NORTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Primary,
    diameter_growth: [
        -4.69624, 0.339513, -0.000428261, 1.19952, 1.15612, -0.0000446327, -0.0237003,
    ],
    height_diameter: [7.04524, -5.16836, -0.253869],
    crown_base: [1.94093, -0.0065029, -0.0048737, -0.261573, 1.08785, 0.0],
    max_crown_width: [4.6198, 1.8426, -0.011311, 81.0],
    largest_crown_exponent: 0.35,
    mortality: [-3.0, -0.08, 0.0005, -2.5, -0.005, 0.015],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: [0.8, 0.741139, -0.0594],
    fertilization_mortality: 0.5,
    height_growth: Some(HeightGrowthCoefficients {
        rate: 0.025,
        shape: 1.3,
        crown_modifier: [0.5, 2.0, 0.04],
    }),
};

const GF_NORTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Primary,
    diameter_growth: [
        -2.34619, 0.594640, -0.000976092, 1.12712, 0.555333, -0.0000290672, -0.0470848,
    ],
    height_diameter: [7.42808, -5.80832, -0.240317],
    crown_base: [2.1, -0.0065, -0.0045, -0.25, 1.0, 0.0],
    max_crown_width: [6.1880, 1.0069, 0.0, 999.0],
    largest_crown_exponent: 0.35,
    mortality: [-3.2, -0.07, 0.0004, -2.0, -0.004, 0.010],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: [0.6, 0.741139, -0.0594],
    fertilization_mortality: 0.3,
    height_growth: Some(HeightGrowthCoefficients {
        rate: 0.022,
        shape: 1.25,
        crown_modifier: [0.4, 2.0, 0.03],
    }),
};

const WH_NORTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Secondary,
    diameter_growth: [
        -4.49867, 0.337675, -0.00031488, 1.56345, 1.04202, -0.0000568, -0.0246,
    ],
    height_diameter: [6.55572, -5.21141, -0.339369],
    crown_base: [2.3, -0.006, -0.004, -0.24, 0.95, 0.0],
    max_crown_width: [4.5652, 1.4147, 0.0, 999.0],
    largest_crown_exponent: 0.3,
    mortality: [-3.3, -0.06, 0.0004, -1.8, -0.004, 0.009],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: [0.5, 0.741139, -0.0594],
    fertilization_mortality: 0.3,
    height_growth: Some(HeightGrowthCoefficients {
        rate: 0.03,
        shape: 1.2,
        crown_modifier: [0.35, 2.0, 0.025],
    }),
};

const RC_NORTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Secondary,
    diameter_growth: [-2.60537, 0.45, -0.0005, 1.0, 0.65, -0.00003, -0.035],
    height_diameter: [7.2004, -5.37049, -0.219826],
    crown_base: [2.5, -0.006, -0.004, -0.23, 0.9, 0.0],
    max_crown_width: [4.0, 1.65, 0.0, 999.0],
    largest_crown_exponent: 0.3,
    mortality: [-3.8, -0.05, 0.0003, -1.5, -0.003, 0.007],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: None,
};

const BM_NORTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Primary,
    diameter_growth: [-3.2, 0.45, -0.0005, 0.9, 0.7, -0.00005, -0.03],
    height_diameter: [4.7, -2.5, -0.5],
    crown_base: [1.5, -0.007, -0.005, -0.27, 1.1, 0.0],
    max_crown_width: [4.0953, 2.3849, -0.011630, 102.0],
    largest_crown_exponent: 0.25,
    mortality: [-2.8, -0.07, 0.0006, -2.2, -0.004, 0.014],
    max_crown_base_ratio: 0.92,
    thinning_response: HARDWOOD_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: None,
};

const RA_NORTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Primary,
    diameter_growth: [-4.62, 0.5, -0.00055, 1.01, 1.0, -0.00008, -0.025],
    height_diameter: [5.59186, -3.32656, -0.331548],
    crown_base: [1.2, -0.007, -0.006, -0.28, 1.1, 0.0],
    max_crown_width: [8.0, 1.53, 0.0, 999.0],
    largest_crown_exponent: 0.25,
    mortality: [-2.2, -0.08, 0.0008, -2.8, -0.005, 0.020],
    max_crown_base_ratio: 0.92,
    thinning_response: HARDWOOD_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: None,
};

// stand management cooperative: plantation-calibrated Douglas-fir, grand fir
// grown on the height-ratio path

const DF_SMC: SpeciesCoefficients = SpeciesCoefficients {
    diameter_growth: [
        -4.5, 0.339513, -0.000428261, 1.19952, 1.15612, -0.0000446327, -0.0237003,
    ],
    ..DF_NORTH
};

const GF_SMC: SpeciesCoefficients = SpeciesCoefficients {
    height_growth: None,
    ..GF_NORTH
};

// southwest Oregon

const DF_SOUTH: SpeciesCoefficients = SpeciesCoefficients {
    diameter_growth: [
        -5.35017, 0.404, -0.000369, 1.1, 1.25, -0.0000459, -0.022,
    ],
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    ..DF_NORTH
};

const WF_SOUTH: SpeciesCoefficients = SpeciesCoefficients {
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    ..GF_NORTH
};

const PP_SOUTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Secondary,
    diameter_growth: [-4.0, 0.6, -0.0007, 1.1, 0.8, -0.00005, -0.04],
    height_diameter: [7.0, -5.2, -0.2],
    crown_base: [1.6, -0.0065, -0.005, -0.27, 1.1, 0.0],
    max_crown_width: [3.4835, 1.343, -0.0082544, 81.0],
    largest_crown_exponent: 0.35,
    mortality: [-3.0, -0.09, 0.0005, -2.6, -0.005, 0.016],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: Some(HeightGrowthCoefficients {
        rate: 0.018,
        shape: 1.2,
        crown_modifier: [0.6, 2.0, 0.05],
    }),
};

const SP_SOUTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Secondary,
    diameter_growth: [-3.8, 0.6, -0.0006, 1.05, 0.82, -0.00004, -0.04],
    height_diameter: [7.1, -5.0, -0.22],
    crown_base: [1.8, -0.0065, -0.005, -0.26, 1.05, 0.0],
    max_crown_width: [4.6467, 1.3944, 0.0, 999.0],
    largest_crown_exponent: 0.35,
    mortality: [-3.1, -0.08, 0.0004, -2.4, -0.005, 0.014],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: Some(HeightGrowthCoefficients {
        rate: 0.02,
        shape: 1.25,
        crown_modifier: [0.5, 2.0, 0.045],
    }),
};

const IC_SOUTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Primary,
    diameter_growth: [-3.5, 0.5, -0.0005, 1.0, 0.7, -0.00004, -0.035],
    height_diameter: [6.9, -5.3, -0.21],
    crown_base: [2.2, -0.006, -0.004, -0.24, 0.95, 0.0],
    max_crown_width: [4.0920, 1.3440, 0.0, 999.0],
    largest_crown_exponent: 0.3,
    mortality: [-3.5, -0.06, 0.0003, -1.8, -0.004, 0.009],
    max_crown_base_ratio: 0.95,
    thinning_response: CONIFER_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: Some(HeightGrowthCoefficients {
        rate: 0.017,
        shape: 1.15,
        crown_modifier: [0.4, 2.0, 0.03],
    }),
};

const PM_SOUTH: SpeciesCoefficients = SpeciesCoefficients {
    site_curve: SiteCurve::Primary,
    diameter_growth: [-3.0, 0.4, -0.0006, 0.8, 0.6, -0.00005, -0.03],
    height_diameter: [5.0, -3.0, -0.4],
    crown_base: [1.8, -0.007, -0.005, -0.26, 1.1, 0.0],
    max_crown_width: [3.4298, 2.0586, 0.0, 999.0],
    largest_crown_exponent: 0.25,
    mortality: [-2.9, -0.07, 0.0005, -2.2, -0.004, 0.013],
    max_crown_base_ratio: 0.92,
    thinning_response: HARDWOOD_THINNING,
    fertilization_response: NO_FERTILIZATION,
    fertilization_mortality: 0.0,
    height_growth: None,
};

pub(crate) const NWO: &[(Species, SpeciesCoefficients)] = &[
    (Species::DouglasFir, DF_NORTH),
    (Species::GrandFir, GF_NORTH),
    (Species::WesternHemlock, WH_NORTH),
    (Species::WesternRedcedar, RC_NORTH),
    (Species::BigleafMaple, BM_NORTH),
    (Species::RedAlder, RA_NORTH),
];

pub(crate) const SMC: &[(Species, SpeciesCoefficients)] = &[
    (Species::DouglasFir, DF_SMC),
    (Species::GrandFir, GF_SMC),
    (Species::WesternHemlock, WH_NORTH),
    (Species::WesternRedcedar, RC_NORTH),
    (Species::BigleafMaple, BM_NORTH),
    (Species::RedAlder, RA_NORTH),
];

pub(crate) const SWO: &[(Species, SpeciesCoefficients)] = &[
    (Species::DouglasFir, DF_SOUTH),
    (Species::WhiteFir, WF_SOUTH),
    (Species::PonderosaPine, PP_SOUTH),
    (Species::SugarPine, SP_SOUTH),
    (Species::IncenseCedar, IC_SOUTH),
    (Species::PacificMadrone, PM_SOUTH),
    (Species::BigleafMaple, BM_NORTH),
];
