pub mod calibration;
pub mod coefficients;
pub mod crown;
pub mod density;
pub mod diameter;
pub mod height;
pub mod mortality;
pub mod pipeline;
pub mod response;
pub mod variant;

pub use calibration::{Calibration, CalibrationState};
pub use coefficients::{HeightGrowthCoefficients, SiteCurve, SpeciesCoefficients};
pub use density::DensityProfile;
pub use pipeline::{GrowthOutcome, GrowthPipeline};
pub use variant::ModelVariant;
