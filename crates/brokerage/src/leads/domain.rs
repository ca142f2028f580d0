use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::ServiceId;
use crate::questionnaire::{ContactDetails, FormData, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub String);

impl QuoteId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Completed questionnaire as posted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub session_id: SessionId,
    pub services: Vec<ServiceId>,
    pub form_data: FormData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    Received,
    Contacted,
    Closed,
}

impl SubmissionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Received => "received",
            SubmissionStatus::Contacted => "contacted",
            SubmissionStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub session_id: SessionId,
    pub services: Vec<ServiceId>,
    pub form_data: FormData,
    pub contact: ContactDetails,
    pub status: SubmissionStatus,
    pub received_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            id: self.id.clone(),
            status: self.status.label(),
            services: self.services.clone(),
            contact_name: format!("{} {}", self.contact.first_name, self.contact.last_name)
                .trim()
                .to_string(),
            received_at: self.received_at,
        }
    }
}

/// What the API exposes about a stored lead. Answers and contact details stay server side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: SubmissionId,
    pub status: &'static str,
    pub services: Vec<ServiceId>,
    pub contact_name: String,
    pub received_at: DateTime<Utc>,
}

/// Checkpoint posted after each questionnaire step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStepRequest {
    pub session_id: SessionId,
    pub service_type: String,
    pub step_name: String,
    #[serde(default)]
    pub response_data: Map<String, Value>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Stored checkpoint, unique per session, service and step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    pub id: u64,
    pub session_id: SessionId,
    pub service_type: String,
    pub step_name: String,
    pub response_data: Map<String, Value>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionnaireResponse {
    pub fn key(&self) -> (&SessionId, &str, &str) {
        (&self.session_id, &self.service_type, &self.step_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceQuoteRequest {
    pub coverage_types: Vec<String>,
    pub property_address: String,
    #[serde(default)]
    pub property_value: Option<f64>,
    pub contact: ContactDetails,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceQuoteRecord {
    pub id: QuoteId,
    pub request: InsuranceQuoteRequest,
    pub status: SubmissionStatus,
    pub received_at: DateTime<Utc>,
}
