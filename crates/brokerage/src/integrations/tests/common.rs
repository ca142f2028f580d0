use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::calculator::FlatRateTable;
use crate::integrations::{
    CountyTaxAssessment, CountyTaxQuery, CountyTaxSource, IntegrationError, IntegrationState,
    PlacePrediction, PlaceReview, PlaceReviews, PlacesSource, PropertyDataSource,
    PropertySearchRequest, PropertySummary, ReviewSource, Zestimate,
};

/// Canned provider answers keyed by address; records every county query it receives.
#[derive(Default)]
pub(crate) struct FakeProvider {
    pub listings: Vec<PropertySummary>,
    pub county_tax: Option<f64>,
    pub county_queries: Mutex<Vec<CountyTaxQuery>>,
    pub fail: bool,
}

impl FakeProvider {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn outage(&self) -> Result<(), IntegrationError> {
        if self.fail {
            return Err(IntegrationError::Status {
                service: "fake provider",
                status: 500,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PropertyDataSource for FakeProvider {
    async fn search(
        &self,
        request: &PropertySearchRequest,
    ) -> Result<Vec<PropertySummary>, IntegrationError> {
        self.outage()?;
        Ok(self
            .listings
            .iter()
            .filter(|listing| {
                listing.zipcode.as_deref() == Some(request.location.as_str())
                    || listing.address.contains(&request.location)
            })
            .cloned()
            .collect())
    }

    async fn zestimate(&self, zpid: &str) -> Result<Zestimate, IntegrationError> {
        self.outage()?;
        let listing = self
            .listings
            .iter()
            .find(|listing| listing.zpid.as_deref() == Some(zpid));
        Ok(Zestimate {
            zpid: zpid.to_string(),
            zestimate: listing.and_then(|listing| listing.zestimate),
            rent_zestimate: listing.and_then(|listing| listing.rent_zestimate),
        })
    }

    async fn lookup_by_address(
        &self,
        address: &str,
    ) -> Result<Option<PropertySummary>, IntegrationError> {
        self.outage()?;
        Ok(self
            .listings
            .iter()
            .find(|listing| listing.address == address)
            .cloned())
    }
}

#[async_trait]
impl CountyTaxSource for FakeProvider {
    async fn annual_tax(
        &self,
        query: &CountyTaxQuery,
    ) -> Result<CountyTaxAssessment, IntegrationError> {
        self.county_queries
            .lock()
            .expect("county query lock")
            .push(query.clone());
        self.outage()?;
        match self.county_tax {
            Some(annual_tax) => Ok(CountyTaxAssessment {
                annual_tax,
                millage_rate: Some(18.9),
                folio: Some("123456-0000".to_string()),
            }),
            None => Err(IntegrationError::NotConfigured("fake county")),
        }
    }
}

pub(crate) struct FakePlaces;

#[async_trait]
impl PlacesSource for FakePlaces {
    async fn autocomplete(&self, input: &str) -> Result<Vec<PlacePrediction>, IntegrationError> {
        Ok(vec![PlacePrediction {
            description: format!("{input} Ave, Tampa, FL, USA"),
            place_id: "ChIJfake".to_string(),
        }])
    }
}

#[async_trait]
impl ReviewSource for FakePlaces {
    async fn reviews(&self) -> Result<PlaceReviews, IntegrationError> {
        Ok(PlaceReviews {
            name: Some("Bay Realty Group".to_string()),
            rating: Some(4.8),
            total_ratings: Some(97),
            reviews: vec![PlaceReview {
                author_name: "Jordan".to_string(),
                rating: 5,
                text: "Closed in three weeks".to_string(),
                relative_time_description: "a month ago".to_string(),
                time: 1_717_000_000,
                profile_photo_url: None,
            }],
        })
    }
}

pub(crate) fn bay_ave() -> PropertySummary {
    PropertySummary {
        zpid: Some("45012".to_string()),
        address: "4102 W Bay Ave, Tampa, FL 33616".to_string(),
        price: Some(455_000.0),
        zestimate: Some(462_300.0),
        rent_zestimate: Some(3_150.0),
        bedrooms: Some(3.0),
        bathrooms: Some(2.0),
        living_area: Some(1_740.0),
        property_type: Some("SINGLE_FAMILY".to_string()),
        zipcode: Some("33616".to_string()),
    }
}

pub(crate) fn dakota_ave() -> PropertySummary {
    PropertySummary {
        zpid: Some("45077".to_string()),
        address: "918 S Dakota Ave, Tampa, FL 33616".to_string(),
        price: Some(380_000.0),
        zestimate: None,
        zipcode: Some("33616".to_string()),
        ..PropertySummary::default()
    }
}

pub(crate) fn naples_condo() -> PropertySummary {
    PropertySummary {
        zpid: Some("88001".to_string()),
        address: "77 Gulf Shore Blvd, Naples, FL 34102".to_string(),
        price: Some(1_200_000.0),
        zipcode: Some("34102".to_string()),
        ..PropertySummary::default()
    }
}

pub(crate) fn provider() -> FakeProvider {
    FakeProvider {
        listings: vec![bay_ave(), dakota_ave(), naples_condo()],
        county_tax: Some(7_850.0),
        ..FakeProvider::default()
    }
}

pub(crate) fn state_with(provider: Arc<FakeProvider>) -> IntegrationState {
    IntegrationState {
        google_maps_api_key: Some("test-maps-key".to_string()),
        places: Arc::new(FakePlaces),
        reviews: Arc::new(FakePlaces),
        property: provider.clone(),
        county_tax: provider,
        flat_rates: FlatRateTable::embedded(),
    }
}

pub(crate) fn unconfigured_state() -> IntegrationState {
    IntegrationState::unconfigured()
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
