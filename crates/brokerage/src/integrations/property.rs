use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::IntegrationError;

const SERVICE: &str = "property data provider";
const API_KEY_HEADER: &str = "X-RapidAPI-Key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchRequest {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds_min: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_type: Option<String>,
}

/// Listing as reported by the provider. Every attribute other than the address is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySummary {
    pub zpid: Option<String>,
    pub address: String,
    pub price: Option<f64>,
    pub zestimate: Option<f64>,
    pub rent_zestimate: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub living_area: Option<f64>,
    pub property_type: Option<String>,
    pub zipcode: Option<String>,
}

impl PropertySummary {
    /// Best available value: the provider's estimate, else the list price.
    pub fn value(&self) -> Option<f64> {
        self.zestimate.or(self.price).filter(|value| *value > 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Zestimate {
    pub zpid: String,
    pub zestimate: Option<f64>,
    pub rent_zestimate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipcodeAverage {
    pub zip_code: String,
    pub average_price: f64,
    pub sample_size: usize,
}

#[async_trait]
pub trait PropertyDataSource: Send + Sync {
    async fn search(
        &self,
        request: &PropertySearchRequest,
    ) -> Result<Vec<PropertySummary>, IntegrationError>;
    async fn zestimate(&self, zpid: &str) -> Result<Zestimate, IntegrationError>;
    /// `None` when the provider has no parcel at that address.
    async fn lookup_by_address(
        &self,
        address: &str,
    ) -> Result<Option<PropertySummary>, IntegrationError>;
}

/// Mean listing value in a zip code, derived from a provider search. `None` when nothing priced
/// came back.
pub async fn zipcode_average(
    source: &dyn PropertyDataSource,
    zip_code: &str,
) -> Result<Option<ZipcodeAverage>, IntegrationError> {
    let listings = source
        .search(&PropertySearchRequest {
            location: zip_code.to_string(),
            ..PropertySearchRequest::default()
        })
        .await?;

    let values: Vec<f64> = listings.iter().filter_map(PropertySummary::value).collect();
    if values.is_empty() {
        return Ok(None);
    }

    let average = values.iter().sum::<f64>() / values.len() as f64;
    Ok(Some(ZipcodeAverage {
        zip_code: zip_code.to_string(),
        average_price: average.round(),
        sample_size: values.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    props: Vec<PropertySummary>,
}

/// Client for the Zillow-style listing API.
#[derive(Debug, Clone)]
pub struct PropertyApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PropertyApiClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, IntegrationError> {
        self.client
            .get(format!("{}/{path}", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path, "property provider request failed");
                IntegrationError::Transport {
                    service: SERVICE,
                    source: e,
                }
            })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, IntegrationError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "property provider returned an error status");
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
impl PropertyDataSource for PropertyApiClient {
    #[instrument(skip(self), fields(location = %request.location))]
    async fn search(
        &self,
        request: &PropertySearchRequest,
    ) -> Result<Vec<PropertySummary>, IntegrationError> {
        let mut query = vec![("location", request.location.clone())];
        if let Some(min) = request.min_price {
            query.push(("minPrice", min.to_string()));
        }
        if let Some(max) = request.max_price {
            query.push(("maxPrice", max.to_string()));
        }
        if let Some(beds) = request.beds_min {
            query.push(("bedsMin", beds.to_string()));
        }
        if let Some(home_type) = &request.home_type {
            query.push(("home_type", home_type.clone()));
        }

        let response = self.get("propertyExtendedSearch", &query).await?;
        let body: SearchResponse = Self::decode(response).await?;
        debug!(count = body.props.len(), "property search results received");
        Ok(body.props)
    }

    #[instrument(skip(self))]
    async fn zestimate(&self, zpid: &str) -> Result<Zestimate, IntegrationError> {
        let response = self
            .get("zestimate", &[("zpid", zpid.to_string())])
            .await?;
        let mut body: Zestimate = Self::decode(response).await?;
        if body.zpid.is_empty() {
            body.zpid = zpid.to_string();
        }
        Ok(body)
    }

    #[instrument(skip(self))]
    async fn lookup_by_address(
        &self,
        address: &str,
    ) -> Result<Option<PropertySummary>, IntegrationError> {
        let response = self
            .get("property", &[("address", address.to_string())])
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("provider has no parcel at this address");
            return Ok(None);
        }
        let property: PropertySummary = Self::decode(response).await?;
        Ok(Some(property))
    }
}
