//! HTTP API for risk prediction
//!
//! REST endpoints over the prediction pipeline using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Service banner
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus-formatted metrics
//! - `GET /api/model-info` - Descriptive model metadata
//! - `POST /api/predict` - Risk prediction for one patient record
//!
//! ## Example
//!
//! ```rust,ignore
//! use prever::api::{create_router, AppState};
//!
//! let state = AppState::demo()?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```
//!
//! Input validation happens here, before the pipeline: malformed bodies and
//! range or enum violations are rejected with 400 and the structured failure
//! shape, and never reach pipeline internals. Pipeline failures map to 400
//! when client-attributable (missing features) and 500 for internal
//! consistency faults.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::error::PreverError;
use crate::interpret::RiskTier;
use crate::metrics::MetricsCollector;
use crate::pipeline::{Pipeline, PredictionResult, MODEL_DESCRIPTION};
use crate::record::PatientRecord;

mod types;

pub use types::{HealthResponse, ModelInfoResponse, RootResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Prediction pipeline over the loaded artifact bundle
    pipeline: Arc<Pipeline>,
    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state over a loaded pipeline
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// State over the deterministic demo bundle, for tests and `serve --demo`
    ///
    /// # Errors
    ///
    /// Returns an error if the demo bundle fails its consistency checks.
    pub fn demo() -> crate::error::Result<Self> {
        let bundle = crate::artifacts::ArtifactBundle::demo()?;
        Ok(Self::new(Pipeline::new(bundle)))
    }

    /// The pipeline this state serves
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

/// Build the service router with permissive CORS for browser frontends
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/model-info", get(model_info_handler))
        .route("/api/predict", post(predict_handler))
        .layer(cors)
        .with_state(state)
}

/// Service banner
async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        status: "DR Risk Predictor API is running".to_string(),
    })
}

/// Health check handler
async fn health_handler(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        // A constructed AppState always has a dimension-checked bundle;
        // startup refuses to build one otherwise.
        model_loaded: true,
    })
}

/// Prometheus metrics handler
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// Descriptive model metadata handler
async fn model_info_handler(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let artifacts = state.pipeline.artifacts();
    Json(ModelInfoResponse {
        model_name: "Diabetic Retinopathy Risk Classifier".to_string(),
        model_type: MODEL_DESCRIPTION.to_string(),
        architecture: artifacts.classifier.architecture(),
        features_used: artifacts.schema.column_vec(),
        risk_tiers: [
            RiskTier::VeryLow,
            RiskTier::Low,
            RiskTier::Moderate,
            RiskTier::High,
        ]
        .iter()
        .map(|t| t.label().to_string())
        .collect(),
    })
}

/// Prediction handler
///
/// Validates the record at the boundary, then runs the pipeline. Every
/// rejected request, including ones serde refuses to deserialize (unknown
/// enum values, missing fields, malformed JSON), gets the structured failure
/// result so callers receive the full required-feature list alongside the
/// status code.
async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<PredictionResult>, (StatusCode, Json<PredictionResult>)> {
    let record = match payload {
        Ok(Json(record)) => record,
        Err(rejection) => {
            state.metrics.record_failure();
            let e = PreverError::InvalidInput {
                field: "body".to_string(),
                reason: rejection.body_text(),
            };
            return Err((
                StatusCode::BAD_REQUEST,
                Json(state.pipeline.failure_from(&e)),
            ));
        }
    };

    if let Err(e) = record.validate() {
        state.metrics.record_failure();
        return Err((
            StatusCode::BAD_REQUEST,
            Json(state.pipeline.failure_from(&e)),
        ));
    }

    let start = Instant::now();
    match state.pipeline.evaluate(&record.to_values()) {
        Ok(probability) => {
            state.metrics.record_success(start.elapsed());
            Ok(Json(state.pipeline.success_from(probability)))
        }
        Err(e) => {
            state.metrics.record_failure();
            let status = match &e {
                PreverError::MissingFeatures { .. } | PreverError::InvalidInput { .. } => {
                    StatusCode::BAD_REQUEST
                }
                // Artifacts out of sync is a deployment fault; be loud.
                other => {
                    eprintln!("internal pipeline fault: {other}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Err((status, Json(state.pipeline.failure_from(&e))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        create_router(AppState::demo().expect("demo state"))
    }

    fn predict_request(json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request")
    }

    const VALID_BODY: &str = r#"{
        "age": 45,
        "gender": "Male",
        "time_in_hospital": 2,
        "num_lab_procedures": 30,
        "num_medications": 5,
        "number_outpatient": 0,
        "number_emergency": 0,
        "number_inpatient": 0,
        "number_diagnoses": 2,
        "insulin": "No",
        "diabetesMed": "Yes"
    }"#;

    #[tokio::test]
    async fn test_root_banner() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let parsed: RootResponse = serde_json::from_slice(&body).expect("json");
        assert!(parsed.status.contains("running"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let parsed: HealthResponse = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed.status, "healthy");
        assert!(parsed.model_loaded);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_is_prometheus_text() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(text.contains("prever_requests_total"));
    }

    #[tokio::test]
    async fn test_model_info() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/model-info")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let parsed: ModelInfoResponse = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed.features_used.len(), 11);
        assert_eq!(parsed.risk_tiers.len(), 4);
        assert!(parsed.architecture.starts_with("Input(11)"));
    }

    #[tokio::test]
    async fn test_predict_success() {
        let response = test_app()
            .oneshot(predict_request(VALID_BODY))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let result: PredictionResult = serde_json::from_slice(&body).expect("json");
        let PredictionResult::Success {
            probability,
            risk_level,
            ..
        } = result
        else {
            panic!("expected success result");
        };
        assert!((0.0..=100.0).contains(&probability));
        assert!(risk_level.ends_with("RISK"));
    }

    #[tokio::test]
    async fn test_predict_out_of_range_age_is_400() {
        let body = VALID_BODY.replace("\"age\": 45", "\"age\": 300");
        let response = test_app()
            .oneshot(predict_request(&body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let result: PredictionResult = serde_json::from_slice(&body).expect("json");
        let PredictionResult::Failure { error, .. } = result else {
            panic!("expected failure result");
        };
        assert!(error.contains("age"));
    }

    #[tokio::test]
    async fn test_predict_bad_enum_is_400_with_failure_body() {
        // Serde rejects unknown enum values before our validation runs; the
        // rejection still carries the structured failure shape.
        let body = VALID_BODY.replace("\"Male\"", "\"Other\"");
        let response = test_app()
            .oneshot(predict_request(&body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let result: PredictionResult = serde_json::from_slice(&body).expect("json");
        let PredictionResult::Failure {
            error,
            required_features,
            ..
        } = result
        else {
            panic!("expected failure result");
        };
        assert!(error.contains("gender"));
        assert_eq!(required_features.len(), 11);
    }

    #[tokio::test]
    async fn test_predict_records_metrics() {
        let state = AppState::demo().expect("demo state");
        let app = create_router(state.clone());

        app.oneshot(predict_request(VALID_BODY))
            .await
            .expect("response");

        assert_eq!(state.metrics.total_requests(), 1);
        assert_eq!(state.metrics.successful_requests(), 1);
    }
}
