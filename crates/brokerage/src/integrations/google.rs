use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::IntegrationError;

const GOOGLE_PLACES_BASE: &str = "https://maps.googleapis.com/maps/api/place";
const SERVICE: &str = "google places";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePrediction {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceReview {
    pub author_name: String,
    pub rating: u8,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relative_time_description: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}

/// Business listing summary shown in the testimonials strip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceReviews {
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: Option<u32>,
    pub reviews: Vec<PlaceReview>,
}

#[async_trait]
pub trait PlacesSource: Send + Sync {
    async fn autocomplete(&self, input: &str) -> Result<Vec<PlacePrediction>, IntegrationError>;
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn reviews(&self) -> Result<PlaceReviews, IntegrationError>;
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<PlacePrediction>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<DetailsResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    reviews: Vec<PlaceReview>,
}

fn check_status(status: &str, message: Option<String>) -> Result<(), IntegrationError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(IntegrationError::Upstream {
            service: SERVICE,
            message: message.unwrap_or_else(|| other.to_string()),
        }),
    }
}

/// Places API client for address autocomplete and the brokerage's own reviews.
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: reqwest::Client,
    api_key: String,
    place_id: Option<String>,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(client: reqwest::Client, api_key: String, place_id: Option<String>) -> Self {
        Self {
            client,
            api_key,
            place_id,
            base_url: GOOGLE_PLACES_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, IntegrationError> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path, "google places request failed");
                IntegrationError::Transport {
                    service: SERVICE,
                    source: e,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, path, "google places returned an error status");
            return Err(IntegrationError::Status {
                service: SERVICE,
                status,
            });
        }

        response
            .json()
            .await
            .map_err(IntegrationError::transport(SERVICE))
    }
}

#[async_trait]
impl PlacesSource for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn autocomplete(&self, input: &str) -> Result<Vec<PlacePrediction>, IntegrationError> {
        let body: AutocompleteResponse = self
            .get_json(
                "autocomplete/json",
                &[
                    ("input", input),
                    ("types", "address"),
                    ("components", "country:us"),
                ],
            )
            .await?;
        check_status(&body.status, body.error_message)?;
        debug!(count = body.predictions.len(), "autocomplete predictions received");
        Ok(body.predictions)
    }
}

#[async_trait]
impl ReviewSource for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn reviews(&self) -> Result<PlaceReviews, IntegrationError> {
        let place_id = self
            .place_id
            .as_deref()
            .ok_or(IntegrationError::NotConfigured("google place id"))?;

        let body: DetailsResponse = self
            .get_json(
                "details/json",
                &[
                    ("place_id", place_id),
                    ("fields", "name,rating,user_ratings_total,reviews"),
                ],
            )
            .await?;
        check_status(&body.status, body.error_message)?;

        Ok(body
            .result
            .map(|result| PlaceReviews {
                name: result.name,
                rating: result.rating,
                total_ratings: result.user_ratings_total,
                reviews: result.reviews,
            })
            .unwrap_or_default())
    }
}
