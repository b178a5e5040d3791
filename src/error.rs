use thiserror::Error;

/// Errors that can occur while building or simulating a stand trajectory.
#[derive(Error, Debug)]
pub enum ForestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// Malformed stand: non-positive sizes, crown ratio outside 0..=1,
    /// species the active model variant does not support, bad treatment history.
    #[error("Structural input error: {0}")]
    StructuralInput(String),

    /// Calibration ratios, site indices or treatment magnitudes outside
    /// their documented ranges.
    #[error("Configuration range error: {0}")]
    ConfigurationRange(String),

    /// Internal consistency check failed. Indicates a defect in the engine.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}
