use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::{Map, Value};
use tower::ServiceExt;

use crate::workflows::grants::domain::{ApplicantRecord, CropYield, SocialCategory};
use crate::workflows::grants::fraud::AnomalySignal;
use crate::workflows::grants::models::{AnomalyDetector, ApprovalModel, ModelError, ModelStatus};
use crate::workflows::grants::signals::SignalTable;
use crate::workflows::grants::{grant_router, GrantPrioritizationService};

/// Smallholder with strong need: rule score 48, marginalized, first-time applicant.
pub(super) fn smallholder() -> ApplicantRecord {
    let mut record = ApplicantRecord::new("F001");
    record.full_name = "Sita Tamang".to_string();
    record.municipality = Some("Dhulikhel".to_string());
    record.monthly_income = 12_000.0;
    record.land_size_bigha = 1.5;
    record.previous_grants = 0;
    record.crop_yield = CropYield::Low;
    record.family_size = 6;
    record.age = 45;
    record.farming_experience_years = 10;
    record.credit_score = 550;
    record.market_distance_km = 8.0;
    record.uses_modern_technology = false;
    record.social_category = SocialCategory::Dalit;
    record
}

/// Well-off applicant: rule score 22, repeat grantee.
pub(super) fn large_holder() -> ApplicantRecord {
    let mut record = ApplicantRecord::new("F002");
    record.full_name = "Ram Shrestha".to_string();
    record.monthly_income = 50_000.0;
    record.land_size_bigha = 6.0;
    record.previous_grants = 3;
    record.crop_yield = CropYield::High;
    record.family_size = 2;
    record.age = 35;
    record.farming_experience_years = 10;
    record.credit_score = 750;
    record.market_distance_km = 2.0;
    record.uses_modern_technology = true;
    record
}

pub(super) fn signal(score: f64, is_anomaly: bool) -> AnomalySignal {
    AnomalySignal::new(score, is_anomaly).expect("finite score")
}

pub(super) fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub(super) fn signal_table() -> SignalTable {
    let csv = "farmer_id,approval_probability,anomaly_score,is_anomaly\n\
F001,0.9,-0.35,true\n\
F002,0.2,0.08,false\n";
    SignalTable::from_reader(Cursor::new(csv)).expect("signal table")
}

pub(super) type TableService = GrantPrioritizationService<SignalTable, SignalTable>;

pub(super) fn service_with(table: SignalTable) -> TableService {
    let table = Arc::new(table);
    GrantPrioritizationService::new(table.clone(), table)
}

pub(super) fn loaded_service() -> TableService {
    service_with(signal_table())
}

pub(super) fn unloaded_service() -> TableService {
    service_with(SignalTable::unloaded())
}

/// Upstream adapter whose backend is unreachable.
pub(super) struct OfflineBackend;

impl ApprovalModel for OfflineBackend {
    fn approval_probability(&self, _record: &ApplicantRecord) -> Result<f64, ModelError> {
        Err(ModelError::Backend("connection refused".to_string()))
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::not_loaded("remote")
    }
}

impl AnomalyDetector for OfflineBackend {
    fn detect(&self, _record: &ApplicantRecord) -> Result<AnomalySignal, ModelError> {
        Err(ModelError::Backend("connection refused".to_string()))
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::not_loaded("remote")
    }
}

pub(super) fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

pub(super) async fn post_json(router: axum::Router, uri: &str, body: Value) -> Response {
    router
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
                .expect("request"),
        )
        .await
        .expect("route executes")
}

pub(super) fn router_for(service: TableService) -> axum::Router {
    grant_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
