//! # Prever
//!
//! Diabetic-retinopathy risk inference server with offline training tools.
//!
//! Prever (Spanish: "to foresee") wraps a fitted tabular MLP classifier in a
//! thin HTTP API. The core of the crate is the prediction pipeline: input
//! sanitization, schema-driven feature alignment, standardization, model
//! inference, and risk-tier interpretation, executed as one atomic call per
//! request over artifacts that are loaded once at startup and immutable for
//! the process lifetime.
//!
//! ## Example
//!
//! ```rust
//! use prever::artifacts::ArtifactBundle;
//! use prever::pipeline::Pipeline;
//! use prever::record::{Gender, PatientRecord, YesNo};
//!
//! let pipeline = Pipeline::new(ArtifactBundle::demo().unwrap());
//! let record = PatientRecord {
//!     age: 45,
//!     gender: Gender::Male,
//!     time_in_hospital: 2,
//!     num_lab_procedures: 30,
//!     num_medications: 5,
//!     number_outpatient: 0,
//!     number_emergency: 0,
//!     number_inpatient: 0,
//!     number_diagnoses: 2,
//!     insulin: YesNo::No,
//!     diabetes_med: YesNo::Yes,
//! };
//! let result = pipeline.predict(&record);
//! assert!(result.is_success());
//! ```
//!
//! ## Architecture
//!
//! Artifacts (schema, scaler, classifier) are plain JSON files written by
//! the `train` command and loaded by `serve`; the pipeline is injected into
//! the HTTP state explicitly, so every layer is testable with in-memory
//! artifacts.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::float_cmp)] // Exact float comparisons are intentional in tests
#![allow(clippy::cast_lossless)]
#![allow(clippy::uninlined_format_args)]

/// Feature alignment against the frozen schema
pub mod align;
/// HTTP API layer
pub mod api;
/// Artifact loading and lifecycle
pub mod artifacts;
/// Fitted MLP classifier
pub mod classifier;
pub mod error;
/// Probability to risk-tier interpretation
pub mod interpret;
/// Request metrics for monitoring
pub mod metrics;
/// The prediction pipeline
pub mod pipeline;
/// Patient record types and boundary validation
pub mod record;
/// Junk-value sanitization
pub mod sanitize;
/// Feature standardization
pub mod scaler;
/// The frozen feature schema
pub mod schema;
/// Offline training and validation
pub mod train;

// Re-exports for convenience
pub use error::{PreverError, Result};
pub use pipeline::{Pipeline, PredictionResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
