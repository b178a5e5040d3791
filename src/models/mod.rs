mod species;
mod tree;
mod cohort;
mod stand;
mod treatment;
mod volume;

pub use species::Species;
pub use tree::{basal_area_sqft, TreeRecord};
pub use cohort::Trees;
pub use stand::{SiteQuality, Stand};
pub use treatment::{Fertilization, Thinning, TreatmentHistory, MAX_TREATMENTS};
pub use volume::VolumeEquation;
