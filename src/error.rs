//! Error types for print-orient operations.
//!
//! Ingestion is lenient (malformed records are coerced or dropped before they
//! ever become an error), inference is strict. The variants below are the
//! failures that survive that policy.

use std::fmt;
use std::path::PathBuf;

/// Main error type for print-orient operations.
///
/// # Examples
///
/// ```
/// use print_orient::error::OrientError;
///
/// let err = OrientError::InconsistentModelState {
///     expected: 13,
///     actual: 12,
///     context: "scaler".to_string(),
/// };
/// assert!(err.to_string().contains("expected 13 features"));
/// ```
#[derive(Debug)]
pub enum OrientError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A fitted artifact was asked to work with a feature width it was not
    /// fitted for (scaler vs. regressor, or caller input vs. scaler).
    InconsistentModelState {
        /// Feature width the artifact was fitted on
        expected: usize,
        /// Feature width supplied
        actual: usize,
        /// Which artifact detected the mismatch
        context: String,
    },

    /// A required input file or persisted artifact does not exist.
    MissingArtifact {
        /// Path that was looked up
        path: PathBuf,
        /// What the file was supposed to hold
        what: String,
    },

    /// Not enough clean samples to train.
    InsufficientData {
        /// Samples available after cleaning
        available: usize,
        /// Minimum required
        required: usize,
    },

    /// Mesh could not be measured. The feature extractor recovers from this
    /// with a fallback vector; it only escapes from direct mesh calls.
    GeometryExtraction {
        /// Error description
        message: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Estimator used before `fit`.
    NotFitted {
        /// Estimator name
        what: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for OrientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            OrientError::InconsistentModelState {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Inconsistent model state ({context}): expected {expected} features, got {actual}"
                )
            }
            OrientError::MissingArtifact { path, what } => {
                write!(f, "Missing {what}: {}", path.display())
            }
            OrientError::InsufficientData {
                available,
                required,
            } => {
                write!(
                    f,
                    "Insufficient training data: {available} samples, at least {required} required"
                )
            }
            OrientError::GeometryExtraction { message } => {
                write!(f, "Geometry extraction failed: {message}")
            }
            OrientError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            OrientError::NotFitted { what } => {
                write!(f, "{what} is not fitted, call fit() first")
            }
            OrientError::Io(e) => write!(f, "I/O error: {e}"),
            OrientError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            OrientError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for OrientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrientError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OrientError {
    fn from(err: std::io::Error) -> Self {
        OrientError::Io(err)
    }
}

impl From<serde_json::Error> for OrientError {
    fn from(err: serde_json::Error) -> Self {
        OrientError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for OrientError {
    fn from(err: bincode::Error) -> Self {
        OrientError::Serialization(err.to_string())
    }
}

impl From<&str> for OrientError {
    fn from(msg: &str) -> Self {
        OrientError::Other(msg.to_string())
    }
}

impl From<String> for OrientError {
    fn from(msg: String) -> Self {
        OrientError::Other(msg)
    }
}

impl OrientError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a feature-width mismatch error for a fitted artifact
    #[must_use]
    pub fn width_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::InconsistentModelState {
            expected,
            actual,
            context: context.to_string(),
        }
    }

    /// Create a missing artifact error
    #[must_use]
    pub fn missing(path: impl Into<PathBuf>, what: &str) -> Self {
        Self::MissingArtifact {
            path: path.into(),
            what: what.to_string(),
        }
    }

    /// Returns true for prediction-time width mismatches.
    #[must_use]
    pub fn is_inconsistent_model_state(&self) -> bool {
        matches!(self, Self::InconsistentModelState { .. })
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, OrientError>;
