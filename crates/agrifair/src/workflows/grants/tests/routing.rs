use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::grants::router::{predict_handler, status_handler, PredictBody};
use crate::workflows::grants::signals::SignalTable;

#[tokio::test]
async fn predict_route_scores_with_inline_probability() {
    let router = router_for(unloaded_service());

    let response = post_json(
        router,
        "/api/v1/predict",
        json!({
            "farmer_data": {
                "farmer_id": "F001",
                "full_name": "Sita Tamang",
                "monthly_income": 12000,
                "land_size_bigha": 1.5,
                "previous_grants": 0,
                "social_category": "dalit"
            },
            "grant_id": "G-2025-01",
            "approval_probability": 0.9
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["farmer_id"], "F001");
    assert_eq!(payload["priority_score"], 9.6);
    assert_eq!(payload["predicted_status"], "approved");
    assert_eq!(payload["recommendation"], "Highly Recommended");
    assert!(payload["reasoning"].as_array().expect("reasons").len() > 1);
}

#[tokio::test]
async fn predict_handler_returns_service_unavailable_without_model() {
    let service = Arc::new(unloaded_service());
    let body: PredictBody = serde_json::from_value(json!({
        "farmer_data": { "farmer_id": "F001" }
    }))
    .expect("body");

    let response =
        predict_handler::<SignalTable, SignalTable>(State(service), axum::Json(body)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("message")
        .contains("Model not loaded"));
}

#[tokio::test]
async fn predict_route_rejects_malformed_fields() {
    let router = router_for(loaded_service());

    let response = post_json(
        router,
        "/api/v1/predict",
        json!({
            "farmer_data": { "farmer_id": "F001", "monthly_income": -500 },
            "approval_probability": 0.5
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "monthly_income");
}

#[tokio::test]
async fn predict_route_rejects_missing_signal() {
    let router = router_for(loaded_service());

    let response = post_json(
        router,
        "/api/v1/predict",
        json!({ "farmer_data": { "farmer_id": "F404" } }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn batch_route_ranks_and_summarises() {
    let router = router_for(loaded_service());

    let response = post_json(
        router,
        "/api/v1/predict/batch",
        json!({
            "grant_id": "G-2025-01",
            "farmers": [
                { "farmer_id": "F002", "monthly_income": 50000, "land_size_bigha": 6, "previous_grants": 3 },
                { "farmer_id": "F001", "monthly_income": 12000, "land_size_bigha": 1.5, "social_category": "dalit" },
                { "farmer_id": "F050", "monthly_income": 20000, "land_size_bigha": 3, "approval_probability": 0.5 }
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let predictions = payload["predictions"].as_array().expect("predictions");
    let order: Vec<&str> = predictions
        .iter()
        .map(|prediction| prediction["farmer_id"].as_str().expect("id"))
        .collect();
    assert_eq!(order, vec!["F001", "F050", "F002"]);
    assert_eq!(payload["summary"]["total_farmers"], 3);
    assert_eq!(payload["summary"]["high_priority"], 1);
    assert_eq!(payload["summary"]["medium_priority"], 1);
    assert_eq!(payload["summary"]["low_priority"], 1);
}

#[tokio::test]
async fn batch_route_rejects_empty_batches() {
    let router = router_for(loaded_service());

    let response = post_json(router, "/api/v1/predict/batch", json!({ "farmers": [] })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "batch");
}

#[tokio::test]
async fn fraud_route_reports_distribution() {
    let router = router_for(unloaded_service());

    let response = post_json(
        router,
        "/api/v1/fraud/detect",
        json!({
            "applications": [
                { "farmer_id": "F001", "farmer_name": "Sita Tamang", "monthly_income": 32000, "anomaly_score": -0.45, "is_anomaly": true },
                { "farmer_id": "F002", "monthly_income": 18000, "land_size_bigha": 3, "previous_grants": 1, "anomaly_score": 0.1, "is_anomaly": false }
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["total_applications"], 2);
    assert_eq!(payload["fraud_detected"], 1);
    assert_eq!(payload["risk_distribution"]["High Risk"], 1);
    assert_eq!(payload["risk_distribution"]["Medium Risk"], 0);
    assert_eq!(payload["risk_distribution"]["Low Risk"], 1);
    assert_eq!(payload["results"][0]["farmer_name"], "Sita Tamang");
    assert_eq!(payload["results"][0]["risk_level"], "High Risk");
    assert_eq!(
        payload["message"],
        "Fraud detection completed. Found 1 suspicious applications."
    );
    let stamped = payload["timestamp"].as_str().expect("timestamp");
    assert!(chrono::DateTime::parse_from_rfc3339(stamped).is_ok());
}

#[tokio::test]
async fn fraud_route_surfaces_backend_failures() {
    let backend = Arc::new(OfflineBackend);
    let service = crate::workflows::grants::GrantPrioritizationService::new(
        backend.clone(),
        backend,
    );
    let router = crate::workflows::grants::grant_router(Arc::new(service));

    let response = post_json(
        router,
        "/api/v1/fraud/detect",
        json!({ "applications": [{ "farmer_id": "F001" }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_handler_reports_models() {
    let response =
        status_handler::<SignalTable, SignalTable>(State(Arc::new(loaded_service()))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["approval_model"]["status"], "ready");
    assert_eq!(payload["anomaly_detector"]["signals"], 2);
}

#[tokio::test]
async fn status_route_is_a_get() {
    let router = router_for(unloaded_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/model/status")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["approval_model"]["model_loaded"], false);
}
