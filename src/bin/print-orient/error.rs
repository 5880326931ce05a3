//! Error types for the print-orient binary.

use print_orient::OrientError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Input file or artifact missing
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input exists but could not be parsed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Bad flag values or too little data
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Persisted models disagree with each other or with the input
    #[error("Model load failed: {0}")]
    ModelLoadFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other library failure
    #[error("{0}")]
    Orient(String),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::InvalidFormat(_) => ExitCode::from(4),
            Self::ValidationFailed(_) => ExitCode::from(5),
            Self::ModelLoadFailed(_) => ExitCode::from(6),
            Self::Io(_) => ExitCode::from(7),
            Self::Orient(_) => ExitCode::from(1),
        }
    }
}

impl From<OrientError> for CliError {
    fn from(e: OrientError) -> Self {
        match e {
            OrientError::MissingArtifact { path, .. } => Self::FileNotFound(path),
            OrientError::Serialization(_) | OrientError::GeometryExtraction { .. } => {
                Self::InvalidFormat(e.to_string())
            }
            OrientError::InsufficientData { .. } | OrientError::InvalidHyperparameter { .. } => {
                Self::ValidationFailed(e.to_string())
            }
            OrientError::InconsistentModelState { .. } | OrientError::NotFitted { .. } => {
                Self::ModelLoadFailed(e.to_string())
            }
            OrientError::Io(io) => Self::Io(io),
            other => Self::Orient(other.to_string()),
        }
    }
}
