//! API request/response types
//!
//! Shapes for the service's descriptive endpoints. The prediction payload
//! itself is [`crate::record::PatientRecord`] in and
//! [`crate::pipeline::PredictionResult`] out.

use serde::{Deserialize, Serialize};

/// Root endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    /// Static service banner
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether a model bundle is loaded and servable
    pub model_loaded: bool,
}

/// Model info response
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    /// Human-readable model name
    pub model_name: String,
    /// Model family
    pub model_type: String,
    /// Layer architecture string
    pub architecture: String,
    /// Ordered feature column names the model consumes
    pub features_used: Vec<String>,
    /// Risk tier labels, lowest first
    pub risk_tiers: Vec<String>,
}
