use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    InsuranceQuoteRecord, QuestionnaireResponse, SaveStepRequest, SubmissionId, SubmissionRecord,
};
use crate::questionnaire::SessionId;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait LeadRepository: Send + Sync {
    fn insert_submission(
        &self,
        record: SubmissionRecord,
    ) -> Result<SubmissionRecord, RepositoryError>;
    fn fetch_submission(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionRecord>, RepositoryError>;
    /// Inserts or replaces the checkpoint for `(session, service, step)`, keeping its id and
    /// creation time on replacement.
    fn upsert_response(
        &self,
        request: SaveStepRequest,
    ) -> Result<QuestionnaireResponse, RepositoryError>;
    /// Checkpoints for a session, oldest first.
    fn session_responses(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<QuestionnaireResponse>, RepositoryError>;
    fn insert_quote(
        &self,
        record: InsuranceQuoteRecord,
    ) -> Result<InsuranceQuoteRecord, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook that tells the brokerage team about a new lead (CRM, e-mail, chat).
pub trait LeadNotifier: Send + Sync {
    fn notify(&self, notification: LeadNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadNotification {
    pub template: String,
    pub reference: String,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
