use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use super::IntegrationError;

const SERVICE: &str = "hillsborough tax estimator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyTaxQuery {
    pub address: String,
    pub assessed_value: f64,
    #[serde(default)]
    pub homestead: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyTaxAssessment {
    pub annual_tax: f64,
    #[serde(default)]
    pub millage_rate: Option<f64>,
    #[serde(default)]
    pub folio: Option<String>,
}

#[async_trait]
pub trait CountyTaxSource: Send + Sync {
    async fn annual_tax(
        &self,
        query: &CountyTaxQuery,
    ) -> Result<CountyTaxAssessment, IntegrationError>;
}

/// Client for the Hillsborough County property-tax estimator.
#[derive(Debug, Clone)]
pub struct HillsboroughTaxClient {
    client: reqwest::Client,
    url: String,
}

impl HillsboroughTaxClient {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl CountyTaxSource for HillsboroughTaxClient {
    #[instrument(skip(self), fields(address = %query.address))]
    async fn annual_tax(
        &self,
        query: &CountyTaxQuery,
    ) -> Result<CountyTaxAssessment, IntegrationError> {
        let response = self
            .client
            .post(&self.url)
            .json(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "county tax request failed");
                IntegrationError::Transport {
                    service: SERVICE,
                    source: e,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "county tax estimator returned an error status");
            return Err(IntegrationError::Status {
                service: SERVICE,
                status,
            });
        }

        let assessment: CountyTaxAssessment = response
            .json()
            .await
            .map_err(IntegrationError::transport(SERVICE))?;
        if !(assessment.annual_tax.is_finite() && assessment.annual_tax >= 0.0) {
            return Err(IntegrationError::Upstream {
                service: SERVICE,
                message: format!("implausible annual tax {}", assessment.annual_tax),
            });
        }
        Ok(assessment)
    }
}
