//! Outbound lookups: Google Places, the property data provider and the county tax estimator.
//!
//! Every source sits behind an `async_trait` seam so the router and the address estimator can be
//! exercised with fakes. Sources that are not configured are replaced by [`Unconfigured`], which
//! fails every call and lets the caller fall back.

mod county;
mod google;
mod property;
mod router;

#[cfg(test)]
pub(crate) mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::calculator::{AddressEstimator, FlatRateTable};
use crate::config::IntegrationConfig;

pub use county::{CountyTaxAssessment, CountyTaxQuery, CountyTaxSource, HillsboroughTaxClient};
pub use google::{
    GooglePlacesClient, PlacePrediction, PlaceReview, PlaceReviews, PlacesSource, ReviewSource,
};
pub use property::{
    zipcode_average, PropertyApiClient, PropertyDataSource, PropertySearchRequest,
    PropertySummary, Zestimate, ZipcodeAverage,
};
pub use router::integration_router;

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} rejected the request: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
}

impl IntegrationError {
    pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| IntegrationError::Transport { service, source }
    }
}

/// Shared outbound client honouring the configured timeout.
pub fn http_client(config: &IntegrationConfig) -> Result<reqwest::Client, IntegrationError> {
    reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!("brokerage/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(IntegrationError::transport("http client"))
}

/// Stand-in for a source whose credentials are missing.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl PlacesSource for Unconfigured {
    async fn autocomplete(&self, _input: &str) -> Result<Vec<PlacePrediction>, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

#[async_trait]
impl ReviewSource for Unconfigured {
    async fn reviews(&self) -> Result<PlaceReviews, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

#[async_trait]
impl PropertyDataSource for Unconfigured {
    async fn search(
        &self,
        _request: &PropertySearchRequest,
    ) -> Result<Vec<PropertySummary>, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }

    async fn zestimate(&self, _zpid: &str) -> Result<Zestimate, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }

    async fn lookup_by_address(
        &self,
        _address: &str,
    ) -> Result<Option<PropertySummary>, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

#[async_trait]
impl CountyTaxSource for Unconfigured {
    async fn annual_tax(
        &self,
        _query: &CountyTaxQuery,
    ) -> Result<CountyTaxAssessment, IntegrationError> {
        Err(IntegrationError::NotConfigured(self.0))
    }
}

/// Handles to every outbound source, shared by the integration routes.
#[derive(Clone)]
pub struct IntegrationState {
    pub google_maps_api_key: Option<String>,
    pub places: Arc<dyn PlacesSource>,
    pub reviews: Arc<dyn ReviewSource>,
    pub property: Arc<dyn PropertyDataSource>,
    pub county_tax: Arc<dyn CountyTaxSource>,
    pub flat_rates: &'static FlatRateTable,
}

impl std::fmt::Debug for IntegrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationState")
            .field("google_maps_api_key", &self.google_maps_api_key.is_some())
            .field("flat_rates", &self.flat_rates.len())
            .finish_non_exhaustive()
    }
}

impl IntegrationState {
    /// Every source unconfigured; lookups fall back or report 503.
    pub fn unconfigured() -> Self {
        Self {
            google_maps_api_key: None,
            places: Arc::new(Unconfigured("google places")),
            reviews: Arc::new(Unconfigured("google reviews")),
            property: Arc::new(Unconfigured("property data provider")),
            county_tax: Arc::new(Unconfigured("hillsborough tax estimator")),
            flat_rates: FlatRateTable::embedded(),
        }
    }

    pub fn from_config(config: &IntegrationConfig) -> Result<Self, IntegrationError> {
        let client = http_client(config)?;
        let mut state = Self::unconfigured();

        match &config.google_maps_api_key {
            Some(key) => {
                let google = Arc::new(GooglePlacesClient::new(
                    client.clone(),
                    key.clone(),
                    config.google_place_id.clone(),
                ));
                state.google_maps_api_key = Some(key.clone());
                state.places = google.clone();
                state.reviews = google;
            }
            None => warn!("GOOGLE_MAPS_API_KEY not set; autocomplete and reviews disabled"),
        }

        match (&config.property_api_base_url, &config.property_api_key) {
            (Some(base_url), Some(key)) => {
                state.property = Arc::new(PropertyApiClient::new(
                    client.clone(),
                    base_url.clone(),
                    key.clone(),
                ));
            }
            _ => warn!("property data provider not configured; lookups will be unavailable"),
        }

        match &config.hillsborough_tax_url {
            Some(url) => {
                state.county_tax = Arc::new(HillsboroughTaxClient::new(client, url.clone()));
            }
            None => info!("hillsborough tax estimator not configured; using flat rates"),
        }

        Ok(state)
    }

    pub fn address_estimator(&self) -> AddressEstimator {
        AddressEstimator::new(
            Arc::clone(&self.property),
            Arc::clone(&self.county_tax),
            self.flat_rates,
        )
    }
}
