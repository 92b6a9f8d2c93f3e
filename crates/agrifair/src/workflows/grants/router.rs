use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::domain::ScoringError;
use super::fraud::AnomalyResult;
use super::models::{AnomalyDetector, ApprovalModel, ModelError};
use super::report::{FraudSummary, PrioritySummary};
use super::scoring::Prediction;
use super::service::{
    FraudRequest, GrantPrioritizationService, GrantServiceError, PredictionRequest,
};

/// Router builder exposing prioritisation, fraud screening and model status.
pub fn grant_router<M, D>(service: Arc<GrantPrioritizationService<M, D>>) -> Router
where
    M: ApprovalModel + 'static,
    D: AnomalyDetector + 'static,
{
    Router::new()
        .route("/api/v1/predict", post(predict_handler::<M, D>))
        .route("/api/v1/predict/batch", post(predict_batch_handler::<M, D>))
        .route("/api/v1/fraud/detect", post(fraud_handler::<M, D>))
        .route("/api/v1/model/status", get(status_handler::<M, D>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictBody {
    farmer_data: Map<String, Value>,
    #[serde(default)]
    grant_id: Option<String>,
    #[serde(default)]
    approval_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchBody {
    farmers: Vec<Map<String, Value>>,
    #[serde(default)]
    grant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FraudBody {
    applications: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
struct BatchView<'a> {
    predictions: &'a [Prediction],
    summary: &'a PrioritySummary,
}

#[derive(Debug, Serialize)]
struct FraudView<'a> {
    success: bool,
    message: String,
    #[serde(flatten)]
    summary: &'a FraudSummary,
    results: &'a [AnomalyResult],
    timestamp: DateTime<Utc>,
}

pub(crate) async fn predict_handler<M, D>(
    State(service): State<Arc<GrantPrioritizationService<M, D>>>,
    axum::Json(body): axum::Json<PredictBody>,
) -> Response
where
    M: ApprovalModel + 'static,
    D: AnomalyDetector + 'static,
{
    let request = match PredictionRequest::from_fields(&body.farmer_data) {
        Ok(request) => request,
        Err(error) => return invalid_input(&error),
    };
    let request = PredictionRequest {
        grant_id: body.grant_id,
        approval_probability: body.approval_probability.or(request.approval_probability),
        ..request
    };

    match service.predict(request) {
        Ok(prediction) => (StatusCode::OK, axum::Json(prediction)).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn predict_batch_handler<M, D>(
    State(service): State<Arc<GrantPrioritizationService<M, D>>>,
    axum::Json(body): axum::Json<BatchBody>,
) -> Response
where
    M: ApprovalModel + 'static,
    D: AnomalyDetector + 'static,
{
    let mut requests = Vec::with_capacity(body.farmers.len());
    for fields in &body.farmers {
        match PredictionRequest::from_fields(fields) {
            Ok(request) => requests.push(PredictionRequest {
                grant_id: body.grant_id.clone(),
                ..request
            }),
            Err(error) => return invalid_input(&error),
        }
    }

    match service.predict_batch(requests) {
        Ok(batch) => {
            let view = BatchView {
                predictions: &batch.ranked,
                summary: &batch.summary,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => service_error(error),
    }
}

pub(crate) async fn fraud_handler<M, D>(
    State(service): State<Arc<GrantPrioritizationService<M, D>>>,
    axum::Json(body): axum::Json<FraudBody>,
) -> Response
where
    M: ApprovalModel + 'static,
    D: AnomalyDetector + 'static,
{
    let requests = match body
        .applications
        .iter()
        .map(FraudRequest::from_fields)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(requests) => requests,
        Err(error) => return invalid_input(&error),
    };

    match service.detect_fraud(requests) {
        Ok(batch) => {
            let view = FraudView {
                success: true,
                message: batch.message(),
                summary: &batch.summary,
                results: &batch.results,
                timestamp: Utc::now(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => service_error(error),
    }
}

pub(crate) async fn status_handler<M, D>(
    State(service): State<Arc<GrantPrioritizationService<M, D>>>,
) -> Response
where
    M: ApprovalModel + 'static,
    D: AnomalyDetector + 'static,
{
    (StatusCode::OK, axum::Json(service.status())).into_response()
}

fn invalid_input(error: &ScoringError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "field": error.field(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn service_error(error: GrantServiceError) -> Response {
    match error {
        GrantServiceError::Scoring(error) => invalid_input(&error),
        GrantServiceError::Upstream(ModelError::NotLoaded) => {
            let payload = json!({
                "error": "Model not loaded. Please train the model first.",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        GrantServiceError::Upstream(error @ ModelError::MissingSignal { .. }) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        GrantServiceError::Upstream(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
