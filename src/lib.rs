pub mod config;
pub mod error;
pub mod growth;
pub mod harvest;
pub mod io;
pub mod models;
pub mod trajectory;
pub mod visualization;

pub use config::SimulationConfig;
pub use error::ForestError;
pub use growth::{CalibrationState, DensityProfile, GrowthPipeline, ModelVariant};
pub use harvest::{HarvestPolicy, RemovalSelection, ThinningPrescription, TreeKey};
pub use models::{SiteQuality, Species, Stand, TreatmentHistory, TreeRecord, Trees, VolumeEquation};
pub use trajectory::{FinancialParameters, PeriodYield, Trajectory, TrajectorySettings};
