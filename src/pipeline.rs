//! Prediction pipeline
//!
//! Sequences sanitization, alignment, scaling, inference, and risk
//! interpretation as one atomic call from a patient record to a
//! [`PredictionResult`]. Errors raised by the middle steps are converted to
//! a structured failure result carrying the full required-feature list so
//! callers can self-correct; interpretation itself never fails. The pipeline
//! holds no mutable state and shares only immutable artifacts, so concurrent
//! invocation needs no coordination.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::align::align;
use crate::artifacts::ArtifactBundle;
use crate::interpret::RiskTier;
use crate::record::{FeatureValue, PatientRecord};
use crate::sanitize::sanitize;

/// Descriptive model string reported in success responses
pub const MODEL_DESCRIPTION: &str = "Multi-layer Perceptron risk classifier";

/// Outcome of one prediction, success or structured failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResult {
    /// Successful prediction
    Success {
        /// Always `true`
        success: bool,
        /// Positive-class probability as a percentage, 2 decimal places
        probability: f64,
        /// Risk tier label
        risk_level: String,
        /// Clinical follow-up recommendation
        recommendation: String,
        /// Descriptive model string
        model: String,
        /// Schema column names, in schema order
        features_used: Vec<String>,
    },
    /// Failed prediction with the feature list the caller must supply
    Failure {
        /// Always `false`
        success: bool,
        /// Human-readable reason
        error: String,
        /// Full schema column list, in schema order
        required_features: Vec<String>,
    },
}

impl PredictionResult {
    /// Whether this result is a success
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, PredictionResult::Success { .. })
    }
}

/// Round a unit-interval probability to a percentage with 2 decimal places
fn to_percentage(probability: f32) -> f64 {
    (f64::from(probability) * 100.0 * 100.0).round() / 100.0
}

/// The prediction pipeline over one immutable artifact bundle
#[derive(Debug, Clone)]
pub struct Pipeline {
    artifacts: Arc<ArtifactBundle>,
}

impl Pipeline {
    /// Build a pipeline over loaded artifacts
    #[must_use]
    pub fn new(artifacts: ArtifactBundle) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }

    /// The artifact bundle this pipeline serves
    #[must_use]
    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    /// Predict risk for a validated patient record
    #[must_use]
    pub fn predict(&self, record: &PatientRecord) -> PredictionResult {
        self.predict_values(&record.to_values())
    }

    /// Predict risk for a loosely-typed feature map
    ///
    /// This is the pipeline proper: sanitize, align, scale, infer,
    /// interpret. Any step error becomes a failure result; nothing
    /// propagates or panics.
    #[must_use]
    pub fn predict_values(
        &self,
        values: &BTreeMap<String, FeatureValue>,
    ) -> PredictionResult {
        match self.evaluate(values) {
            Ok(probability) => self.success_from(probability),
            Err(e) => self.failure_from(&e),
        }
    }

    /// Build the success result for a raw probability
    #[must_use]
    pub fn success_from(&self, probability: f32) -> PredictionResult {
        let tier = RiskTier::from_probability(probability);
        PredictionResult::Success {
            success: true,
            probability: to_percentage(probability),
            risk_level: tier.label().to_string(),
            recommendation: tier.recommendation().to_string(),
            model: MODEL_DESCRIPTION.to_string(),
            features_used: self.artifacts.schema.column_vec(),
        }
    }

    /// Build the failure result for a pipeline error
    #[must_use]
    pub fn failure_from(&self, error: &crate::error::PreverError) -> PredictionResult {
        PredictionResult::Failure {
            success: false,
            error: error.to_string(),
            required_features: self.artifacts.schema.column_vec(),
        }
    }

    /// Run the raw pipeline, propagating step errors to the caller
    ///
    /// The HTTP layer uses this to distinguish client-attributable failures
    /// (missing features) from internal consistency faults when choosing a
    /// status code; everyone else wants [`Self::predict_values`].
    ///
    /// # Errors
    ///
    /// Returns `MissingFeatures` for underivable schema columns and
    /// `SchemaMismatch` when artifacts disagree dimensionally.
    pub fn evaluate(&self, values: &BTreeMap<String, FeatureValue>) -> crate::error::Result<f32> {
        let cleaned = sanitize(values);
        let vector = align(&self.artifacts.schema, &cleaned)?;
        let scaled = self.artifacts.scaler.transform(&vector)?;
        self.artifacts.classifier.predict_proba(&scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Gender, YesNo};

    fn pipeline() -> Pipeline {
        Pipeline::new(ArtifactBundle::demo().expect("demo bundle"))
    }

    fn sample_record() -> PatientRecord {
        PatientRecord {
            age: 45,
            gender: Gender::Male,
            time_in_hospital: 2,
            num_lab_procedures: 30,
            num_medications: 5,
            number_outpatient: 0,
            number_emergency: 0,
            number_inpatient: 0,
            number_diagnoses: 2,
            insulin: YesNo::No,
            diabetes_med: YesNo::Yes,
        }
    }

    #[test]
    fn test_end_to_end_success() {
        let result = pipeline().predict(&sample_record());
        match result {
            PredictionResult::Success {
                success,
                probability,
                risk_level,
                features_used,
                ..
            } => {
                assert!(success);
                assert!((0.0..=100.0).contains(&probability));
                assert!(!risk_level.is_empty());
                assert_eq!(features_used.len(), 11);
            }
            PredictionResult::Failure { error, .. } => {
                panic!("expected success, got failure: {error}")
            }
        }
    }

    #[test]
    fn test_determinism() {
        let p = pipeline();
        let record = sample_record();
        let a = serde_json::to_vec(&p.predict(&record)).expect("serialize");
        let b = serde_json::to_vec(&p.predict(&record)).expect("serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn test_features_used_matches_schema() {
        let p = pipeline();
        let result = p.predict(&sample_record());
        let PredictionResult::Success { features_used, .. } = result else {
            panic!("expected success");
        };
        assert_eq!(features_used, p.artifacts().schema.column_vec());
    }

    #[test]
    fn test_sentinels_equal_defaults() {
        let p = pipeline();

        let mut with_sentinels = sample_record().to_values();
        with_sentinels.insert("insulin".to_string(), FeatureValue::Text("?".to_string()));
        with_sentinels.insert("number_outpatient".to_string(), FeatureValue::Null);

        let mut with_defaults = sample_record().to_values();
        with_defaults.insert("insulin".to_string(), FeatureValue::Number(0.0));
        with_defaults.insert("number_outpatient".to_string(), FeatureValue::Number(0.0));

        assert_eq!(
            p.predict_values(&with_sentinels),
            p.predict_values(&with_defaults)
        );
    }

    #[test]
    fn test_missing_feature_reports_full_schema() {
        let p = pipeline();
        let mut values = sample_record().to_values();
        values.remove("age");
        values.remove("gender");

        let result = p.predict_values(&values);
        match result {
            PredictionResult::Failure {
                success,
                error,
                required_features,
            } => {
                assert!(!success);
                assert!(error.contains("age"));
                assert_eq!(required_features, p.artifacts().schema.column_vec());
            }
            PredictionResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn test_unseen_category_does_not_fail() {
        let p = pipeline();
        let mut values = sample_record().to_values();
        values.insert(
            "insulin".to_string(),
            FeatureValue::Text("Steady".to_string()),
        );
        assert!(p.predict_values(&values).is_success());
    }

    #[test]
    fn test_empty_map_fails_with_all_features() {
        let p = pipeline();
        let result = p.predict_values(&BTreeMap::new());
        let PredictionResult::Failure {
            required_features, ..
        } = result
        else {
            panic!("expected failure");
        };
        assert_eq!(required_features.len(), 11);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(to_percentage(0.123_456), 12.35);
        assert_eq!(to_percentage(0.0), 0.0);
        assert_eq!(to_percentage(1.0), 100.0);
    }

    #[test]
    fn test_result_serialization_shapes() {
        let p = pipeline();
        let ok = serde_json::to_value(p.predict(&sample_record())).expect("json");
        assert_eq!(ok["success"], true);
        assert!(ok.get("probability").is_some());
        assert!(ok.get("risk_level").is_some());
        assert!(ok.get("recommendation").is_some());
        assert!(ok.get("model").is_some());
        assert!(ok.get("features_used").is_some());
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(p.predict_values(&BTreeMap::new())).expect("json");
        assert_eq!(err["success"], false);
        assert!(err.get("error").is_some());
        assert!(err.get("required_features").is_some());
        assert!(err.get("probability").is_none());
    }
}
