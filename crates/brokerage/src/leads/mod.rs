//! Lead intake: questionnaire submissions, step checkpoints and insurance quote requests.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    InsuranceQuoteRecord, InsuranceQuoteRequest, LeadSubmission, QuestionnaireResponse, QuoteId,
    SaveStepRequest, SubmissionId, SubmissionRecord, SubmissionStatus, SubmissionView,
};
pub use repository::{LeadNotification, LeadNotifier, LeadRepository, NotifyError, RepositoryError};
pub use router::leads_router;
pub use service::{LeadService, LeadServiceError};
