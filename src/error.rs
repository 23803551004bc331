//! Crate-wide error type

/// Errors produced by training, export, and explanation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid hyperparameter, split fraction, or objective/label pairing
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unreadable or inconsistent training data
    #[error("Data error: {0}")]
    Data(String),

    /// Training could not produce a trustworthy model (e.g. divergent loss)
    #[error("Training error: {0}")]
    Training(String),

    /// A scoring or attribution capability is not available in this build
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Rigorous attribution failed mid-computation
    #[error("Attribution failed: {0}")]
    Attribution(String),

    /// Malformed caller input to the explanation entry point
    #[error("Invalid input: {0}")]
    Input(String),

    /// Malformed or unsupported model artifact / metadata side-car
    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {e}"))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {e}"))
    }
}
