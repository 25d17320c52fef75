//! Artifact loading and lifecycle
//!
//! Three durable artifacts make a servable model: the ordered feature-name
//! list, the fitted scaler, and the fitted classifier. They are loaded once
//! at startup, cross-checked for dimensional agreement, and held as
//! read-only shared state for the process lifetime. A missing or corrupt
//! file, or any dimensional disagreement, is startup-fatal: the process must
//! refuse to become ready rather than serve against half-loaded artifacts.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::classifier::MlpClassifier;
use crate::error::{PreverError, Result};
use crate::scaler::StandardScaler;
use crate::schema::FeatureSchema;

/// File name of the ordered feature-name list artifact
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
/// File name of the fitted scaler artifact
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the fitted classifier artifact
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// The three fitted artifacts a servable model consists of
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    /// Frozen feature schema
    pub schema: FeatureSchema,
    /// Fitted standardization parameters
    pub scaler: StandardScaler,
    /// Fitted classifier
    pub classifier: MlpClassifier,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    let content = fs::read_to_string(&path).map_err(|e| PreverError::ArtifactError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| PreverError::ArtifactError {
        path: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

fn write_json<T: Serialize>(value: &T, dir: &Path, file: &str) -> Result<()> {
    let path = dir.join(file);
    let content =
        serde_json::to_string_pretty(value).map_err(|e| PreverError::ArtifactError {
            path: path.display().to_string(),
            reason: format!("serialization failed: {e}"),
        })?;
    fs::write(&path, content).map_err(|e| PreverError::ArtifactError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

impl ArtifactBundle {
    /// Assemble a bundle, verifying dimensional agreement
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the scaler's parameter count or the
    /// classifier's input width disagrees with the schema length.
    pub fn new(
        schema: FeatureSchema,
        scaler: StandardScaler,
        classifier: MlpClassifier,
    ) -> Result<Self> {
        if scaler.len() != schema.len() {
            return Err(PreverError::SchemaMismatch {
                expected: schema.len(),
                actual: scaler.len(),
            });
        }
        if classifier.input_dim() != schema.len() {
            return Err(PreverError::SchemaMismatch {
                expected: schema.len(),
                actual: classifier.input_dim(),
            });
        }
        Ok(Self {
            schema,
            scaler,
            classifier,
        })
    }

    /// Load the three artifacts from a model directory
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` for a missing or corrupt file and
    /// `SchemaMismatch` if the loaded artifacts disagree dimensionally.
    /// Either way the caller must treat the model directory as unservable.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let schema: FeatureSchema = read_json(dir, FEATURE_NAMES_FILE)?;
        let scaler: StandardScaler = read_json(dir, SCALER_FILE)?;
        let classifier: MlpClassifier = read_json(dir, CLASSIFIER_FILE)?;
        Self::new(schema, scaler, classifier)
    }

    /// Write the three artifacts to a model directory, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if the directory cannot be created or a file
    /// cannot be written.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PreverError::ArtifactError {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        write_json(&self.schema, dir, FEATURE_NAMES_FILE)?;
        write_json(&self.scaler, dir, SCALER_FILE)?;
        write_json(&self.classifier, dir, CLASSIFIER_FILE)?;
        Ok(())
    }

    /// Small deterministic in-memory bundle for tests and `serve --demo`
    ///
    /// Uses the canonical 11-column clinical-admission schema with a seeded
    /// untrained network; predictions are meaningless but stable.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the fallible signature matches [`Self::new`].
    pub fn demo() -> Result<Self> {
        let schema = FeatureSchema::new(
            demo_columns().iter().map(|s| (*s).to_string()).collect(),
        )?;
        let scaler = StandardScaler::new(
            vec![55.0, 4.0, 43.0, 16.0, 0.4, 0.2, 0.6, 7.4, 0.5, 0.5, 0.8],
            vec![15.0, 3.0, 19.0, 8.0, 1.2, 0.9, 1.3, 1.9, 0.5, 0.5, 0.4],
        )?;
        let mut rng = StdRng::seed_from_u64(42);
        let classifier = MlpClassifier::init(schema.len(), &[8, 8], &mut rng);
        Self::new(schema, scaler, classifier)
    }
}

/// Canonical column order of the clinical-admission schema: numeric columns
/// in dataset order, then one indicator per categorical field with its
/// training-time reference category dropped.
#[must_use]
pub fn demo_columns() -> [&'static str; 11] {
    [
        "age",
        "time_in_hospital",
        "num_lab_procedures",
        "num_medications",
        "number_outpatient",
        "number_emergency",
        "number_inpatient",
        "number_diagnoses",
        "gender_Male",
        "insulin_Yes",
        "diabetesMed_Yes",
    ]
}
