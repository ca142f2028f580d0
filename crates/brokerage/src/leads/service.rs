use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    InsuranceQuoteRecord, InsuranceQuoteRequest, LeadSubmission, QuestionnaireResponse, QuoteId,
    SaveStepRequest, SubmissionId, SubmissionRecord, SubmissionStatus,
};
use super::repository::{LeadNotification, LeadNotifier, LeadRepository, RepositoryError};
use crate::catalog::ServiceId;
use crate::questionnaire::{FormKey, SessionId, StepValidationError};

/// Service composing lead validation, the repository and the notifier.
pub struct LeadService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> LeadService<R, N>
where
    R: LeadRepository + 'static,
    N: LeadNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Accept a completed questionnaire, returning the stored record.
    pub fn submit(
        &self,
        submission: LeadSubmission,
    ) -> Result<SubmissionRecord, LeadServiceError> {
        if submission.session_id.0.trim().is_empty() {
            return Err(LeadServiceError::invalid("sessionId", "session id is required"));
        }
        if submission.services.is_empty() {
            return Err(LeadServiceError::invalid(
                "services",
                "select at least one service",
            ));
        }
        if let Some(key) = submission.form_data.stray_key(&submission.services) {
            return Err(LeadServiceError::UnexpectedKey(key));
        }

        let contact = submission.form_data.contact().ok_or_else(|| {
            LeadServiceError::invalid("contact", "contact details are required")
        })?;
        let errors = contact.field_errors();
        if !errors.is_empty() {
            return Err(LeadServiceError::Validation(errors));
        }

        let record = SubmissionRecord {
            id: SubmissionId::generate(),
            session_id: submission.session_id,
            services: submission.services,
            form_data: submission.form_data,
            contact,
            status: SubmissionStatus::Received,
            received_at: Utc::now(),
        };
        let stored = self.repository.insert_submission(record)?;

        let mut details = BTreeMap::new();
        details.insert(
            "services".to_string(),
            stored
                .services
                .iter()
                .map(ServiceId::to_string)
                .collect::<Vec<_>>()
                .join(","),
        );
        details.insert("email".to_string(), stored.contact.email.clone());
        details.insert("name".to_string(), stored.view().contact_name);
        if let Err(err) = self.notifier.notify(LeadNotification {
            template: "lead_received".to_string(),
            reference: stored.id.to_string(),
            details,
        }) {
            warn!(error = %err, submission_id = %stored.id, "lead stored but notification failed");
        }

        info!(
            submission_id = %stored.id,
            session_id = %stored.session_id,
            services = ?stored.services,
            "lead submission received"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &SubmissionId) -> Result<SubmissionRecord, LeadServiceError> {
        let record = self
            .repository
            .fetch_submission(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Record a questionnaire checkpoint. Repeated saves of a step replace the earlier answers.
    pub fn save_step(
        &self,
        request: SaveStepRequest,
    ) -> Result<QuestionnaireResponse, LeadServiceError> {
        if request.session_id.0.trim().is_empty() {
            return Err(LeadServiceError::invalid("sessionId", "session id is required"));
        }
        if FormKey::parse(&request.service_type).is_none() {
            return Err(LeadServiceError::invalid(
                "serviceType",
                format!("unknown service '{}'", request.service_type),
            ));
        }
        if request.step_name.trim().is_empty() {
            return Err(LeadServiceError::invalid("stepName", "step name is required"));
        }

        let response = self.repository.upsert_response(request)?;
        info!(
            session_id = %response.session_id,
            service_type = %response.service_type,
            step_name = %response.step_name,
            completed = response.is_completed,
            "questionnaire step saved"
        );
        Ok(response)
    }

    pub fn session_responses(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<QuestionnaireResponse>, LeadServiceError> {
        Ok(self.repository.session_responses(session_id)?)
    }

    /// Accept an insurance quote request from the standalone insurance page.
    pub fn request_quote(
        &self,
        request: InsuranceQuoteRequest,
    ) -> Result<InsuranceQuoteRecord, LeadServiceError> {
        let mut errors = Vec::new();
        let options = ServiceId::Insurance.category().options;
        if request.coverage_types.is_empty() {
            errors.push(StepValidationError::new(
                "coverageTypes",
                "select at least one type",
            ));
        } else if let Some(unknown) = request
            .coverage_types
            .iter()
            .find(|coverage| !options.contains(&coverage.as_str()))
        {
            errors.push(StepValidationError::new(
                "coverageTypes",
                format!("'{unknown}' is not an insurance option"),
            ));
        }
        if request.property_address.trim().is_empty() {
            errors.push(StepValidationError::new(
                "propertyAddress",
                "enter the property address",
            ));
        }
        if let Some(value) = request.property_value {
            if !(value.is_finite() && value > 0.0) {
                errors.push(StepValidationError::new(
                    "propertyValue",
                    "must be greater than zero",
                ));
            }
        }
        errors.extend(request.contact.field_errors());
        if !errors.is_empty() {
            return Err(LeadServiceError::Validation(errors));
        }

        let record = InsuranceQuoteRecord {
            id: QuoteId::generate(),
            request,
            status: SubmissionStatus::Received,
            received_at: Utc::now(),
        };
        let stored = self.repository.insert_quote(record)?;

        let mut details = BTreeMap::new();
        details.insert(
            "coverage".to_string(),
            stored.request.coverage_types.join(","),
        );
        details.insert("email".to_string(), stored.request.contact.email.clone());
        if let Err(err) = self.notifier.notify(LeadNotification {
            template: "insurance_quote_requested".to_string(),
            reference: stored.id.0.clone(),
            details,
        }) {
            warn!(error = %err, quote_id = %stored.id.0, "quote stored but notification failed");
        }
        Ok(stored)
    }
}

/// Error raised by the lead service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error("{}", summarize(.0))]
    Validation(Vec<StepValidationError>),
    #[error("form data contains '{0}', which is not a selected service")]
    UnexpectedKey(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LeadServiceError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        LeadServiceError::Validation(vec![StepValidationError::new(field, message)])
    }
}

fn summarize(errors: &[StepValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
