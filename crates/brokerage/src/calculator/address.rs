use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::affordability::ANNUAL_INSURANCE_RATE;
use super::tax::{is_hillsborough_city, FlatRateTable, TaxEstimate, TaxSource};
use super::CalculatorError;
use crate::integrations::{CountyTaxQuery, CountyTaxSource, PropertyDataSource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressEstimateRequest {
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    /// Used when the property provider cannot value the address.
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub homestead: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    Provider,
    Provided,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressEstimate {
    pub address: String,
    pub city: Option<String>,
    pub property_value: f64,
    pub value_source: ValueSource,
    pub tax: TaxEstimate,
    pub monthly_insurance: f64,
}

/// City component of a `street, city, state zip` address.
pub fn city_from_address(address: &str) -> Option<String> {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    parts
        .get(parts.len() - 2)
        .filter(|city| !city.is_empty())
        .map(|city| city.to_string())
}

/// Values an address through the property provider and prices its taxes, preferring the county
/// estimator inside Hillsborough and the flat-rate table everywhere else.
#[derive(Clone)]
pub struct AddressEstimator {
    property: Arc<dyn PropertyDataSource>,
    county_tax: Arc<dyn CountyTaxSource>,
    flat_rates: &'static FlatRateTable,
}

impl AddressEstimator {
    pub fn new(
        property: Arc<dyn PropertyDataSource>,
        county_tax: Arc<dyn CountyTaxSource>,
        flat_rates: &'static FlatRateTable,
    ) -> Self {
        Self {
            property,
            county_tax,
            flat_rates,
        }
    }

    pub async fn estimate(
        &self,
        request: &AddressEstimateRequest,
    ) -> Result<AddressEstimate, CalculatorError> {
        let address = request.address.trim();
        if address.is_empty() {
            return Err(CalculatorError::InvalidInput {
                field: "address",
                message: "is required",
            });
        }
        if let Some(value) = request.estimated_value {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalculatorError::InvalidInput {
                    field: "estimatedValue",
                    message: "must be greater than zero",
                });
            }
        }

        let provider_value = match self.property.lookup_by_address(address).await {
            Ok(found) => found.and_then(|property| property.value()),
            Err(err) => {
                warn!(error = %err, "property lookup failed; using the provided value");
                None
            }
        };

        let (property_value, value_source) = match (provider_value, request.estimated_value) {
            (Some(value), _) => (value, ValueSource::Provider),
            (None, Some(value)) => (value, ValueSource::Provided),
            (None, None) => return Err(CalculatorError::ValueUnavailable(address.to_string())),
        };

        let city = request
            .city
            .clone()
            .filter(|city| !city.trim().is_empty())
            .or_else(|| city_from_address(address));

        let query = CountyTaxQuery {
            address: address.to_string(),
            assessed_value: property_value,
            homestead: request.homestead,
        };
        let tax = self.tax_for(&query, city.as_deref()).await;

        Ok(AddressEstimate {
            address: address.to_string(),
            city,
            property_value: property_value.round(),
            value_source,
            monthly_insurance: (property_value * ANNUAL_INSURANCE_RATE / 12.0 * 100.0).round()
                / 100.0,
            tax,
        })
    }

    /// County figure for Hillsborough cities, flat rate otherwise or when the county is down.
    pub async fn tax_for(&self, query: &CountyTaxQuery, city: Option<&str>) -> TaxEstimate {
        if city.is_some_and(is_hillsborough_city) {
            match self.county_tax.annual_tax(query).await {
                Ok(assessment) => {
                    info!(annual_tax = assessment.annual_tax, "county tax estimate received");
                    return TaxEstimate::new(
                        assessment.annual_tax,
                        query.assessed_value,
                        TaxSource::County {
                            county: "Hillsborough".to_string(),
                        },
                    );
                }
                Err(err) => warn!(error = %err, "county tax lookup failed; using flat rate"),
            }
        }
        self.flat_rates.estimate(query.assessed_value, city)
    }
}
