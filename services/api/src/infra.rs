use brokerage::leads::{
    InsuranceQuoteRecord, LeadNotification, LeadNotifier, LeadRepository, NotifyError,
    QuestionnaireResponse, RepositoryError, SaveStepRequest, SubmissionId, SubmissionRecord,
};
use brokerage::questionnaire::domain::{CreditScoreRange, LoanProgram, Occupancy};
use brokerage::questionnaire::SessionId;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    submissions: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
    responses: Arc<Mutex<Vec<QuestionnaireResponse>>>,
    quotes: Arc<Mutex<Vec<InsuranceQuoteRecord>>>,
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert_submission(
        &self,
        record: SubmissionRecord,
    ) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.submissions.lock().expect("repository mutex poisoned");
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
        let guard = self.submissions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn upsert_response(
        &self,
        request: SaveStepRequest,
    ) -> Result<QuestionnaireResponse, RepositoryError> {
        let mut guard = self.responses.lock().expect("repository mutex poisoned");
        let now = Utc::now();
        let key = (
            &request.session_id,
            request.service_type.as_str(),
            request.step_name.as_str(),
        );
        if let Some(existing) = guard.iter_mut().find(|response| response.key() == key) {
            existing.response_data = request.response_data;
            existing.is_completed = request.is_completed;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let next_id = guard.iter().map(|response| response.id).max().unwrap_or(0) + 1;
        let response = QuestionnaireResponse {
            id: next_id,
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
        let guard = self.responses.lock().expect("repository mutex poisoned");
        let mut responses: Vec<_> = guard
            .iter()
            .filter(|response| &response.session_id == session_id)
            .cloned()
            .collect();
        responses.sort_by_key(|response| (response.created_at, response.id));
        Ok(responses)
    }

    fn insert_quote(
        &self,
        record: InsuranceQuoteRecord,
    ) -> Result<InsuranceQuoteRecord, RepositoryError> {
        let mut guard = self.quotes.lock().expect("repository mutex poisoned");
        guard.push(record.clone());
        Ok(record)
    }
}

impl InMemoryLeadRepository {
    pub(crate) fn submissions(&self) -> Vec<SubmissionRecord> {
        self.submissions
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

/// Keeps notifications in memory and logs each one.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadNotifier {
    events: Arc<Mutex<Vec<LeadNotification>>>,
}

impl LeadNotifier for InMemoryLeadNotifier {
    fn notify(&self, notification: LeadNotification) -> Result<(), NotifyError> {
        info!(
            template = %notification.template,
            reference = %notification.reference,
            "lead notification queued"
        );
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryLeadNotifier {
    pub(crate) fn events(&self) -> Vec<LeadNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

pub(crate) fn parse_credit_score(raw: &str) -> Result<CreditScoreRange, String> {
    CreditScoreRange::parse(raw).ok_or_else(|| {
        let labels: Vec<_> = CreditScoreRange::ALL
            .iter()
            .map(|range| range.label())
            .collect();
        format!("unknown credit range '{raw}' (expected one of {})", labels.join(", "))
    })
}

pub(crate) fn parse_loan_program(raw: &str) -> Result<LoanProgram, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "conventional" => Ok(LoanProgram::Conventional),
        "fha" => Ok(LoanProgram::Fha),
        "va" => Ok(LoanProgram::Va),
        "usda" => Ok(LoanProgram::Usda),
        "jumbo" => Ok(LoanProgram::Jumbo),
        "dscr" => Ok(LoanProgram::Dscr),
        "non-qm" | "nonqm" => Ok(LoanProgram::NonQm),
        _ => Err(format!("unknown loan program '{raw}'")),
    }
}

pub(crate) fn parse_occupancy(raw: &str) -> Result<Occupancy, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "primary" => Ok(Occupancy::Primary),
        "secondary" | "second-home" => Ok(Occupancy::Secondary),
        "investment" => Ok(Occupancy::Investment),
        _ => Err(format!("unknown occupancy '{raw}'")),
    }
}
