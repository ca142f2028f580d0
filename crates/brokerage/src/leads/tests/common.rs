use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::catalog::ServiceId;
use crate::leads::domain::{
    InsuranceQuoteRecord, LeadSubmission, QuestionnaireResponse, SaveStepRequest, SubmissionId,
    SubmissionRecord,
};
use crate::leads::repository::{
    LeadNotification, LeadNotifier, LeadRepository, NotifyError, RepositoryError,
};
use crate::leads::LeadService;
use crate::questionnaire::{FormData, FormKey, SessionId};

#[derive(Default, Clone)]
pub(crate) struct MemoryRepository {
    submissions: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
    responses: Arc<Mutex<Vec<QuestionnaireResponse>>>,
    quotes: Arc<Mutex<Vec<InsuranceQuoteRecord>>>,
}

impl MemoryRepository {
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().expect("lock").len()
    }

    pub fn quote_count(&self) -> usize {
        self.quotes.lock().expect("lock").len()
    }
}

impl LeadRepository for MemoryRepository {
    fn insert_submission(
        &self,
        record: SubmissionRecord,
    ) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.submissions.lock().expect("lock");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_submission(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Ok(self.submissions.lock().expect("lock").get(id).cloned())
    }

    fn upsert_response(
        &self,
        request: SaveStepRequest,
    ) -> Result<QuestionnaireResponse, RepositoryError> {
        let mut guard = self.responses.lock().expect("lock");
        let now = Utc::now();
        if let Some(existing) = guard.iter_mut().find(|response| {
            response.key()
                == (
                    &request.session_id,
                    request.service_type.as_str(),
                    request.step_name.as_str(),
                )
        }) {
            existing.response_data = request.response_data;
            existing.is_completed = request.is_completed;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let response = QuestionnaireResponse {
            id: guard.len() as u64 + 1,
            session_id: request.session_id,
            service_type: request.service_type,
            step_name: request.step_name,
            response_data: request.response_data,
            is_completed: request.is_completed,
            created_at: now,
            updated_at: now,
        };
        guard.push(response.clone());
        Ok(response)
    }

    fn session_responses(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<QuestionnaireResponse>, RepositoryError> {
        Ok(self
            .responses
            .lock()
            .expect("lock")
            .iter()
            .filter(|response| &response.session_id == session_id)
            .cloned()
            .collect())
    }

    fn insert_quote(
        &self,
        record: InsuranceQuoteRecord,
    ) -> Result<InsuranceQuoteRecord, RepositoryError> {
        self.quotes.lock().expect("lock").push(record.clone());
        Ok(record)
    }
}

pub(crate) struct UnavailableRepository;

impl LeadRepository for UnavailableRepository {
    fn insert_submission(
        &self,
        _record: SubmissionRecord,
    ) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn fetch_submission(
        &self,
        _id: &SubmissionId,
    ) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn upsert_response(
        &self,
        _request: SaveStepRequest,
    ) -> Result<QuestionnaireResponse, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn session_responses(
        &self,
        _session_id: &SessionId,
    ) -> Result<Vec<QuestionnaireResponse>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn insert_quote(
        &self,
        _record: InsuranceQuoteRecord,
    ) -> Result<InsuranceQuoteRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryNotifier {
    pub sent: Arc<Mutex<Vec<LeadNotification>>>,
    pub fail: bool,
}

impl LeadNotifier for MemoryNotifier {
    fn notify(&self, notification: LeadNotification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("smtp offline".to_string()));
        }
        self.sent.lock().expect("lock").push(notification);
        Ok(())
    }
}

pub(crate) fn build_service() -> (
    Arc<LeadService<MemoryRepository, MemoryNotifier>>,
    MemoryRepository,
    MemoryNotifier,
) {
    let repository = MemoryRepository::default();
    let notifier = MemoryNotifier::default();
    let service = Arc::new(LeadService::new(
        Arc::new(repository.clone()),
        Arc::new(notifier.clone()),
    ));
    (service, repository, notifier)
}

pub(crate) fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

pub(crate) fn contact_fields() -> Map<String, Value> {
    fields(json!({
        "firstName": "Dana",
        "lastName": "Reyes",
        "email": "dana.reyes@example.com",
        "phone": "(813) 555-0142",
        "preferredContact": "email"
    }))
}

pub(crate) fn submission() -> LeadSubmission {
    let mut form_data = FormData::new();
    form_data.merge(
        FormKey::Service(ServiceId::Mortgage),
        fields(json!({
            "purpose": "purchase",
            "creditScore": "740-759",
            "ownershipType": "investment",
            "loanType": "DSCR"
        })),
    );
    form_data.merge(
        FormKey::Service(ServiceId::Insurance),
        fields(json!({ "selectedOptions": ["Homeowners", "Flood"] })),
    );
    form_data.merge(FormKey::Contact, contact_fields());
    LeadSubmission {
        session_id: SessionId("6f1c2a8e-35b4-4c59-9d5e-0d5f6f3b2a11".to_string()),
        services: vec![ServiceId::Mortgage, ServiceId::Insurance],
        form_data,
    }
}

pub(crate) fn quote_request() -> Value {
    json!({
        "coverageTypes": ["Homeowners", "Wind"],
        "propertyAddress": "4102 W Bay Ave, Tampa, FL 33616",
        "propertyValue": 462300.0,
        "contact": contact_fields()
    })
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
