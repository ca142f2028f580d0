use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{zipcode_average, CountyTaxQuery, IntegrationError, IntegrationState};
use super::{PlaceReviews, PropertySearchRequest};
use crate::calculator::{address::city_from_address, AddressEstimateRequest, CalculatorError};

/// Router builder for the third-party lookup proxies and the address-based estimate.
pub fn integration_router(state: IntegrationState) -> Router {
    Router::new()
        .route("/api/config/google-maps-api-key", get(maps_key_handler))
        .route("/api/reviews/google", get(reviews_handler))
        .route("/api/places/autocomplete", get(autocomplete_handler))
        .route("/api/properties/search", post(search_handler))
        .route("/api/properties/zestimate", post(zestimate_handler))
        .route("/api/properties/zipcode-average", post(zipcode_average_handler))
        .route(
            "/api/properties/lookup-by-address",
            post(lookup_by_address_handler),
        )
        .route("/api/property-tax/hillsborough", post(hillsborough_tax_handler))
        .route("/api/calculator/address-estimate", post(address_estimate_handler))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, axum::Json(payload)).into_response()
}

fn upstream_failure(err: IntegrationError) -> Response {
    match err {
        IntegrationError::NotConfigured(_) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        other => {
            warn!(error = %other, "upstream lookup failed");
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}

fn calculator_failure(err: CalculatorError) -> Response {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}

pub(crate) async fn maps_key_handler(State(state): State<IntegrationState>) -> Response {
    match state.google_maps_api_key {
        Some(key) => (StatusCode::OK, axum::Json(json!({ "apiKey": key }))).into_response(),
        None => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "google maps api key not configured",
        ),
    }
}

pub(crate) async fn reviews_handler(State(state): State<IntegrationState>) -> Response {
    let reviews = match state.reviews.reviews().await {
        Ok(reviews) => reviews,
        Err(err) => {
            warn!(error = %err, "reviews unavailable; returning an empty list");
            PlaceReviews::default()
        }
    };
    (StatusCode::OK, axum::Json(reviews)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutocompleteParams {
    #[serde(default)]
    input: String,
}

pub(crate) async fn autocomplete_handler(
    State(state): State<IntegrationState>,
    Query(params): Query<AutocompleteParams>,
) -> Response {
    let input = params.input.trim();
    let predictions = if input.is_empty() {
        Vec::new()
    } else {
        state.places.autocomplete(input).await.unwrap_or_else(|err| {
            warn!(error = %err, "autocomplete unavailable; returning no predictions");
            Vec::new()
        })
    };
    (
        StatusCode::OK,
        axum::Json(json!({ "predictions": predictions })),
    )
        .into_response()
}

pub(crate) async fn search_handler(
    State(state): State<IntegrationState>,
    axum::Json(request): axum::Json<PropertySearchRequest>,
) -> Response {
    if request.location.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "location is required");
    }
    match state.property.search(&request).await {
        Ok(properties) => (
            StatusCode::OK,
            axum::Json(json!({ "properties": properties })),
        )
            .into_response(),
        Err(err) => upstream_failure(err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZestimateRequest {
    #[serde(default)]
    zpid: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

pub(crate) async fn zestimate_handler(
    State(state): State<IntegrationState>,
    axum::Json(request): axum::Json<ZestimateRequest>,
) -> Response {
    let zpid = match (request.zpid, request.address) {
        (Some(zpid), _) if !zpid.trim().is_empty() => zpid,
        (_, Some(address)) if !address.trim().is_empty() => {
            match state.property.lookup_by_address(address.trim()).await {
                Ok(Some(property)) => match property.zpid {
                    Some(zpid) => zpid,
                    None => {
                        return error_response(StatusCode::NOT_FOUND, "no zpid for address")
                    }
                },
                Ok(None) => return error_response(StatusCode::NOT_FOUND, "property not found"),
                Err(err) => return upstream_failure(err),
            }
        }
        _ => return error_response(StatusCode::BAD_REQUEST, "zpid or address is required"),
    };

    match state.property.zestimate(&zpid).await {
        Ok(estimate) => (StatusCode::OK, axum::Json(estimate)).into_response(),
        Err(err) => upstream_failure(err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZipcodeRequest {
    zip_code: String,
}

pub(crate) async fn zipcode_average_handler(
    State(state): State<IntegrationState>,
    axum::Json(request): axum::Json<ZipcodeRequest>,
) -> Response {
    let zip = request.zip_code.trim();
    let valid = zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return error_response(StatusCode::BAD_REQUEST, "zipCode must be five digits");
    }
    match zipcode_average(state.property.as_ref(), zip).await {
        Ok(Some(average)) => (StatusCode::OK, axum::Json(average)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "no priced listings in zip code"),
        Err(err) => upstream_failure(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressRequest {
    address: String,
}

pub(crate) async fn lookup_by_address_handler(
    State(state): State<IntegrationState>,
    axum::Json(request): axum::Json<AddressRequest>,
) -> Response {
    let address = request.address.trim();
    if address.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "address is required");
    }
    match state.property.lookup_by_address(address).await {
        Ok(Some(property)) => (StatusCode::OK, axum::Json(property)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "property not found"),
        Err(err) => upstream_failure(err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HillsboroughTaxRequest {
    address: String,
    #[serde(default)]
    city: Option<String>,
    property_value: f64,
    #[serde(default)]
    homestead: bool,
}

pub(crate) async fn hillsborough_tax_handler(
    State(state): State<IntegrationState>,
    axum::Json(request): axum::Json<HillsboroughTaxRequest>,
) -> Response {
    if !(request.property_value.is_finite() && request.property_value > 0.0) {
        return calculator_failure(CalculatorError::InvalidInput {
            field: "propertyValue",
            message: "must be greater than zero",
        });
    }
    let city = request
        .city
        .clone()
        .or_else(|| city_from_address(&request.address));
    let query = CountyTaxQuery {
        address: request.address.trim().to_string(),
        assessed_value: request.property_value,
        homestead: request.homestead,
    };
    let estimate = state
        .address_estimator()
        .tax_for(&query, city.as_deref())
        .await;
    (StatusCode::OK, axum::Json(estimate)).into_response()
}

pub(crate) async fn address_estimate_handler(
    State(state): State<IntegrationState>,
    axum::Json(request): axum::Json<AddressEstimateRequest>,
) -> Response {
    match state.address_estimator().estimate(&request).await {
        Ok(estimate) => (StatusCode::OK, axum::Json(estimate)).into_response(),
        Err(err) => calculator_failure(err),
    }
}
