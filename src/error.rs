//! Error types for prever
//!
//! All fallible operations in the crate return [`Result`] with [`PreverError`].
//! Validation and alignment failures are expected, client-attributable
//! conditions; artifact and schema faults indicate a broken deployment and are
//! surfaced loudly at startup rather than retried per-request.

use thiserror::Error;

/// Error type for all prever operations
#[derive(Debug, Error)]
pub enum PreverError {
    /// Artifact file missing or corrupt (startup-fatal)
    #[error("Artifact error at {path}: {reason}")]
    ArtifactError {
        /// Path of the offending artifact file
        path: String,
        /// What went wrong while loading it
        reason: String,
    },

    /// Loaded artifacts disagree on dimensionality (deployment fault)
    #[error("Schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch {
        /// Feature count the schema defines
        expected: usize,
        /// Feature count the other artifact carries
        actual: usize,
    },

    /// Schema columns that cannot be derived from the supplied record
    #[error("Missing features: {}", features.join(", "))]
    MissingFeatures {
        /// Names of the underivable schema columns
        features: Vec<String>,
    },

    /// Request field failed boundary validation (client error)
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Name of the offending field
        field: String,
        /// Human-readable reason
        reason: String,
    },

    /// Dataset could not be parsed for training/validation
    #[error("Dataset error: {reason}")]
    DatasetError {
        /// What went wrong while reading the CSV
        reason: String,
    },

    /// Server could not bind or serve (CLI path)
    #[error("Server error: {reason}")]
    ServerError {
        /// What went wrong while serving
        reason: String,
    },
}

/// Result type alias for prever operations
pub type Result<T> = std::result::Result<T, PreverError>;
