//! Branching multi-step lead questionnaire.
//!
//! Each service line with a sub-flow (mortgage, real estate) is described by a guarded
//! transition table; back-navigation uses the inverse generated from that table. The remaining
//! service lines contribute a single details step, and every questionnaire ends on contact.

mod controller;
pub mod domain;
pub mod form_data;
pub mod mortgage;
pub mod real_estate;
pub mod steps;
pub mod storage;
pub mod table;

#[cfg(test)]
mod tests;

pub use controller::{step_count, FlowError, Navigation, Progress, QuestionnaireFlow, StepId};
pub use domain::SessionId;
pub use form_data::{FormData, FormKey};
pub use mortgage::{MortgageFlowState, MortgageStep};
pub use real_estate::{RealEstateFlowState, RealEstateStep};
pub use steps::{
    ContactDetails, MortgageAnswer, RealEstateAnswer, ServiceDetails, StepAnswer,
    StepValidationError,
};
pub use storage::{DeviceStorage, FileStorage, MemoryStorage, StorageError};
