use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::leads::router::submit_handler;
use crate::leads::{leads_router, LeadService};

fn post(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn submit_route_creates_and_exposes_the_lead() {
    let (service, _, _) = build_service();
    let router = leads_router(service);

    let payload = serde_json::to_value(submission()).expect("encode");
    let response = router
        .clone()
        .oneshot(post("/api/submit", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    assert_eq!(created["status"], json!("received"));
    assert_eq!(created["contactName"], json!("Dana Reyes"));
    assert!(created.get("formData").is_none());

    let id = created["id"].as_str().expect("id").to_string();
    let response = router
        .oneshot(get(&format!("/api/submission/{id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["id"], json!(id));
}

#[tokio::test]
async fn unknown_submission_is_not_found() {
    let (service, _, _) = build_service();
    let response = leads_router(service)
        .oneshot(get("/api/submission/does-not-exist"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_handler_reports_field_errors() {
    let (service, repository, _) = build_service();
    let mut lead = submission();
    let mut contact = contact_fields();
    contact.insert("email".to_string(), json!("not-an-email"));
    lead.form_data
        .merge(crate::questionnaire::FormKey::Contact, contact);

    let response = submit_handler(State(service), axum::Json(lead)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["fields"][0]["field"], json!("email"));
    assert_eq!(repository.submission_count(), 0);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(LeadService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
    ));
    let response = submit_handler(State(service), axum::Json(submission())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(read_json_body(response).await["error"]
        .as_str()
        .is_some_and(|message| message.contains("unavailable")));
}

#[tokio::test]
async fn save_step_and_session_routes_round_trip() {
    let (service, _, _) = build_service();
    let router = leads_router(service);

    let payload = json!({
        "sessionId": "s-42",
        "serviceType": "realEstate",
        "stepName": "initial",
        "responseData": { "intent": "buy" },
        "isCompleted": false
    });
    let response = router
        .clone()
        .oneshot(post("/api/questionnaire/save-step", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get("/api/questionnaire/session/s-42"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["sessionId"], json!("s-42"));
    assert_eq!(body["responses"][0]["responseData"], json!({ "intent": "buy" }));
}

#[tokio::test]
async fn quote_route_accepts_and_validates() {
    let (service, _, _) = build_service();
    let router = leads_router(service);

    let response = router
        .clone()
        .oneshot(post("/api/insurance/quote", &quote_request()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json_body(response).await["status"], json!("received"));

    let mut invalid = quote_request();
    invalid["coverageTypes"] = json!([]);
    let response = router
        .oneshot(post("/api/insurance/quote", &invalid))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
