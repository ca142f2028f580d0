use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{InsuranceQuoteRequest, LeadSubmission, SaveStepRequest, SubmissionId};
use super::repository::{LeadNotifier, LeadRepository, RepositoryError};
use super::service::{LeadService, LeadServiceError};
use crate::questionnaire::SessionId;

/// Router builder exposing lead intake and questionnaire checkpoint endpoints.
pub fn leads_router<R, N>(service: Arc<LeadService<R, N>>) -> Router
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    Router::new()
        .route("/api/submit", post(submit_handler::<R, N>))
        .route("/api/submission/:id", get(submission_handler::<R, N>))
        .route(
            "/api/questionnaire/save-step",
            post(save_step_handler::<R, N>),
        )
        .route(
            "/api/questionnaire/session/:session_id",
            get(session_handler::<R, N>),
        )
        .route("/api/insurance/quote", post(quote_handler::<R, N>))
        .with_state(service)
}

fn failure(error: LeadServiceError) -> Response {
    match error {
        LeadServiceError::Validation(errors) => {
            let message = errors
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| "invalid request".to_string());
            let payload = json!({
                "error": message,
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        LeadServiceError::UnexpectedKey(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        LeadServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "submission not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        LeadServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "submission already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<LeadService<R, N>>>,
    axum::Json(submission): axum::Json<LeadSubmission>,
) -> Response
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn submission_handler<R, N>(
    State(service): State<Arc<LeadService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    match service.get(&SubmissionId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn save_step_handler<R, N>(
    State(service): State<Arc<LeadService<R, N>>>,
    axum::Json(request): axum::Json<SaveStepRequest>,
) -> Response
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    match service.save_step(request) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn session_handler<R, N>(
    State(service): State<Arc<LeadService<R, N>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    let session_id = SessionId(session_id);
    match service.session_responses(&session_id) {
        Ok(responses) => {
            let payload = json!({
                "sessionId": session_id,
                "responses": responses,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => failure(error),
    }
}

pub(crate) async fn quote_handler<R, N>(
    State(service): State<Arc<LeadService<R, N>>>,
    axum::Json(request): axum::Json<InsuranceQuoteRequest>,
) -> Response
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    match service.request_quote(request) {
        Ok(record) => {
            let payload = json!({
                "quoteId": record.id,
                "status": record.status.label(),
                "receivedAt": record.received_at,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => failure(error),
    }
}
