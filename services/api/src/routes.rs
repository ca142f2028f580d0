use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use brokerage::calculator::{self, AffordabilityEstimate, AffordabilityInput};
use brokerage::catalog::{catalog, MarketingPage, ServiceCategory, SiteRoute};
use brokerage::error::AppError;
use brokerage::integrations::{integration_router, IntegrationState};
use brokerage::leads::{leads_router, LeadNotifier, LeadRepository, LeadService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn build_router<R, N>(
    leads: Arc<LeadService<R, N>>,
    integrations: IntegrationState,
) -> Router
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    leads_router(leads)
        .merge(integration_router(integrations))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/services", get(services_endpoint))
        .route("/api/pages", get(home_page_endpoint))
        .route("/api/pages/*path", get(page_endpoint))
        .route(
            "/api/calculator/affordability",
            post(affordability_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn services_endpoint() -> Json<&'static [ServiceCategory]> {
    Json(catalog())
}

pub(crate) async fn home_page_endpoint() -> Json<MarketingPage> {
    Json(SiteRoute::Home.page())
}

pub(crate) async fn page_endpoint(Path(path): Path<String>) -> (StatusCode, Json<MarketingPage>) {
    let route = SiteRoute::resolve(&format!("/{path}"));
    let status = if route == SiteRoute::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    (status, Json(route.page()))
}

pub(crate) async fn affordability_endpoint(
    Json(input): Json<AffordabilityInput>,
) -> Result<Json<AffordabilityEstimate>, AppError> {
    input.validate()?;
    Ok(Json(calculator::estimate(&input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryLeadNotifier, InMemoryLeadRepository};
    use axum::body::Body;
    use axum::http::Request;
    use brokerage::catalog::ServiceId;
    use brokerage::questionnaire::domain::{CreditScoreRange, LoanProgram, Occupancy};
    use tower::ServiceExt;

    fn app() -> Router {
        let service = Arc::new(LeadService::new(
            Arc::new(InMemoryLeadRepository::default()),
            Arc::new(InMemoryLeadNotifier::default()),
        ));
        build_router(service, IntegrationState::unconfigured())
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn input() -> AffordabilityInput {
        AffordabilityInput {
            yearly_income: 120_000.0,
            monthly_debts: 500.0,
            credit_score: CreditScoreRange::VeryGood,
            loan_program: LoanProgram::Conventional,
            occupancy: Occupancy::Primary,
            down_payment: Some(60_000.0),
        }
    }

    #[tokio::test]
    async fn affordability_endpoint_returns_estimate() {
        let Json(body) = affordability_endpoint(Json(input()))
            .await
            .expect("estimate builds");
        assert_eq!(body.max_dti, 0.43);
        assert!(body.loan_amount > 0.0);
        assert_eq!(body.max_purchase_price, Some(body.loan_amount + 60_000.0));
    }

    #[tokio::test]
    async fn affordability_endpoint_rejects_missing_income() {
        let request = AffordabilityInput {
            yearly_income: 0.0,
            ..input()
        };
        let err = affordability_endpoint(Json(request))
            .await
            .expect_err("zero income rejected");
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn services_endpoint_lists_catalog_in_order() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/services")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        let services = body.as_array().expect("array of services");
        assert_eq!(services.len(), ServiceId::ALL.len());
        assert_eq!(services[0]["id"], "realEstate");
    }

    #[tokio::test]
    async fn unknown_pages_resolve_to_not_found() {
        let (status, Json(page)) = page_endpoint(Path("mortgage".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page.service, Some(ServiceId::Mortgage));

        let (status, Json(page)) = page_endpoint(Path("listings/42".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(page.route, SiteRoute::NotFound);
    }

    #[tokio::test]
    async fn lead_and_integration_routes_are_mounted() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/config/google-maps-api-key")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/submission/missing")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
