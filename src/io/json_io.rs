use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ForestError;
use crate::models::{SiteQuality, Stand, TreeRecord};
use crate::trajectory::PeriodYield;

/// On-disk description of a stand's initial conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandFile {
    #[serde(default)]
    pub name: String,
    /// Stand age in years.
    pub age: f64,
    pub site: SiteQuality,
    pub trees: Vec<TreeRecord>,
}

impl StandFile {
    pub fn from_stand(name: &str, stand: &Stand) -> Self {
        Self {
            name: name.to_string(),
            age: stand.age,
            site: stand.site,
            trees: stand.records(),
        }
    }

    pub fn into_stand(self) -> Result<Stand, ForestError> {
        Stand::from_records(&self.trees, self.site, self.age)
    }
}

/// Read an initial stand from a JSON file.
pub fn read_stand_json(path: impl AsRef<Path>) -> Result<Stand, ForestError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let file: StandFile = serde_json::from_str(&content)?;
    file.into_stand()
}

/// Read an initial stand from JSON bytes.
pub fn read_stand_json_from_bytes(data: &[u8]) -> Result<Stand, ForestError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| ForestError::ParseError(format!("Invalid UTF-8: {e}")))?;
    let file: StandFile = serde_json::from_str(content)?;
    file.into_stand()
}

/// Write a stand's live trees as a JSON stand file.
pub fn write_stand_json(
    name: &str,
    stand: &Stand,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), ForestError> {
    write_json(&StandFile::from_stand(name, stand), path, pretty)
}

/// Write per-period yields to a JSON file.
pub fn write_yields_json(
    yields: &[PeriodYield],
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), ForestError> {
    write_json(yields, path, pretty)
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>, pretty: bool) -> Result<(), ForestError> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}
