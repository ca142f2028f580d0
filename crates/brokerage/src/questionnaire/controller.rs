use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{Occupancy, SessionId};
use super::form_data::{FormData, FormKey};
use super::mortgage::{MortgageFlowState, MortgageStep};
use super::real_estate::{RealEstateFlowState, RealEstateStep};
use super::steps::{StepAnswer, StepValidationError};
use super::storage::{self, DeviceStorage};
use crate::calculator::affordability::{self, AffordabilityEstimate, AffordabilityInput};
use crate::catalog::ServiceId;
use crate::leads::LeadSubmission;
use crate::selection::SelectedServices;

/// Identifies a single screen of the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "service", content = "step", rename_all = "camelCase")]
pub enum StepId {
    Mortgage(MortgageStep),
    RealEstate(RealEstateStep),
    Details(ServiceId),
    Contact,
}

impl StepId {
    pub fn name(self) -> &'static str {
        match self {
            StepId::Mortgage(step) => step.name(),
            StepId::RealEstate(step) => step.name(),
            StepId::Details(_) => "details",
            StepId::Contact => "contact",
        }
    }

    pub fn service(self) -> Option<ServiceId> {
        match self {
            StepId::Mortgage(_) => Some(ServiceId::Mortgage),
            StepId::RealEstate(_) => Some(ServiceId::RealEstate),
            StepId::Details(id) => Some(id),
            StepId::Contact => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.service() {
            Some(service) => write!(f, "{service}/{}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Where the user lands after a submit or back action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "step", rename_all = "kebab-case")]
pub enum Navigation {
    Step(StepId),
    /// Contact captured; the lead can be submitted.
    Review,
    /// Backed out of the first step of the first service.
    Home,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u16,
    pub total: u16,
    pub percent: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("select at least one service to start the questionnaire")]
    NoServicesSelected,
    #[error("answer for {received} does not match the current step {expected}")]
    StepMismatch { expected: String, received: String },
    #[error(transparent)]
    Invalid(#[from] StepValidationError),
    #[error("contact details are required before submitting")]
    ContactRequired,
    #[error("contact details already captured; submit or go back to edit them")]
    AwaitingSubmission,
    #[error("questionnaire already submitted")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Service(usize),
    Contact,
    Ready,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
enum ServiceFlow {
    Mortgage(MortgageFlowState),
    RealEstate(RealEstateFlowState),
    Details(ServiceId),
}

impl ServiceFlow {
    fn for_service(service: ServiceId) -> Self {
        match service {
            ServiceId::Mortgage => Self::Mortgage(MortgageFlowState::default()),
            ServiceId::RealEstate => Self::RealEstate(RealEstateFlowState::default()),
            other => Self::Details(other),
        }
    }

    fn current(&self) -> StepId {
        match self {
            ServiceFlow::Mortgage(state) => StepId::Mortgage(state.step),
            ServiceFlow::RealEstate(state) => StepId::RealEstate(state.step),
            ServiceFlow::Details(id) => StepId::Details(*id),
        }
    }

    fn record(&mut self, answer: &StepAnswer) {
        match (self, answer) {
            (ServiceFlow::Mortgage(state), StepAnswer::Mortgage(answer)) => state.record(answer),
            (ServiceFlow::RealEstate(state), StepAnswer::RealEstate(answer)) => {
                state.record(answer)
            }
            _ => {}
        }
    }

    fn forward(&mut self) -> bool {
        match self {
            ServiceFlow::Mortgage(state) => state.forward(),
            ServiceFlow::RealEstate(state) => state.forward(),
            ServiceFlow::Details(_) => false,
        }
    }

    fn backward(&mut self) -> bool {
        match self {
            ServiceFlow::Mortgage(state) => state.backward(),
            ServiceFlow::RealEstate(state) => state.backward(),
            ServiceFlow::Details(_) => false,
        }
    }

    fn restart(&mut self) {
        match self {
            ServiceFlow::Mortgage(state) => state.restart(),
            ServiceFlow::RealEstate(state) => state.restart(),
            ServiceFlow::Details(_) => {}
        }
    }

    fn progress_number(&self) -> u16 {
        match self {
            ServiceFlow::Mortgage(state) => state.step.progress_number(),
            ServiceFlow::RealEstate(state) => state.step.progress_number(),
            ServiceFlow::Details(_) => 1,
        }
    }
}

/// Step budget per service used by the progress bar.
pub fn step_count(service: ServiceId) -> u16 {
    match service {
        ServiceId::Mortgage => 10,
        ServiceId::RealEstate => 3,
        _ => 1,
    }
}

fn answer_step(answer: &StepAnswer, service: ServiceId) -> StepId {
    match answer {
        StepAnswer::Mortgage(answer) => StepId::Mortgage(answer.step()),
        StepAnswer::RealEstate(answer) => StepId::RealEstate(answer.step()),
        StepAnswer::Details(_) => StepId::Details(service),
        StepAnswer::Contact(_) => StepId::Contact,
    }
}

/// Drives one prospect through the questionnaire for the services they selected.
///
/// Exactly one step is current at a time. Answers are validated, merged into the service's
/// form-data slice and mirrored to device storage before the cursor moves.
#[derive(Debug)]
pub struct QuestionnaireFlow {
    session_id: SessionId,
    services: SelectedServices,
    flows: BTreeMap<ServiceId, ServiceFlow>,
    cursor: Cursor,
    form_data: FormData,
    storage: Box<dyn DeviceStorage>,
    /// Mortgage was added by the real-estate handoff rather than picked by the prospect.
    handoff_mortgage: bool,
}

impl QuestionnaireFlow {
    /// Starts at the first step of the first selected service, picking up any answers left in
    /// device storage by an earlier visit.
    pub fn start(
        services: SelectedServices,
        mut storage: Box<dyn DeviceStorage>,
    ) -> Result<Self, FlowError> {
        if services.is_empty() {
            return Err(FlowError::NoServicesSelected);
        }

        let session_id = storage::session_id(storage.as_mut());
        let mut form_data = storage::load_form_data(storage.as_ref()).unwrap_or_default();
        form_data.retain_services(&services.ids());
        let resumed = !form_data.is_empty();

        let flows = services
            .iter()
            .map(|service| (service.id, ServiceFlow::for_service(service.id)))
            .collect();

        let mut flow = Self {
            session_id,
            services,
            flows,
            cursor: Cursor::Service(0),
            form_data,
            storage,
            handoff_mortgage: false,
        };
        flow.mirror();

        info!(
            session_id = %flow.session_id,
            services = ?flow.services.ids(),
            resumed,
            "questionnaire started"
        );
        Ok(flow)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn services(&self) -> &SelectedServices {
        &self.services
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn storage(&self) -> &dyn DeviceStorage {
        self.storage.as_ref()
    }

    pub fn current(&self) -> Navigation {
        match self.cursor {
            Cursor::Service(index) => match self.flow_at(index) {
                Some(flow) => Navigation::Step(flow.current()),
                None => Navigation::Step(StepId::Contact),
            },
            Cursor::Contact => Navigation::Step(StepId::Contact),
            Cursor::Ready => Navigation::Review,
            Cursor::Submitted => Navigation::Submitted,
        }
    }

    pub fn mortgage_state(&self) -> Option<&MortgageFlowState> {
        match self.flows.get(&ServiceId::Mortgage) {
            Some(ServiceFlow::Mortgage(state)) => Some(state),
            _ => None,
        }
    }

    pub fn real_estate_state(&self) -> Option<&RealEstateFlowState> {
        match self.flows.get(&ServiceId::RealEstate) {
            Some(ServiceFlow::RealEstate(state)) => Some(state),
            _ => None,
        }
    }

    /// Validates and records the answer for the current step, then advances.
    pub fn submit(&mut self, answer: StepAnswer) -> Result<Navigation, FlowError> {
        let navigation = match self.cursor {
            Cursor::Service(index) => self.submit_service_step(index, answer)?,
            Cursor::Contact => self.submit_contact(answer)?,
            Cursor::Ready => return Err(FlowError::AwaitingSubmission),
            Cursor::Submitted => return Err(FlowError::Finished),
        };

        self.mirror();
        debug!(session_id = %self.session_id, ?navigation, "questionnaire advanced");
        Ok(navigation)
    }

    /// Reverses the last transition. From the first step of the first service this leaves the
    /// questionnaire for the home page without changing any state.
    pub fn back(&mut self) -> Navigation {
        let navigation = match self.cursor {
            Cursor::Service(index) => {
                let moved_within = self
                    .service_at(index)
                    .and_then(|service| self.flows.get_mut(&service))
                    .map(ServiceFlow::backward)
                    .unwrap_or(false);

                if moved_within {
                    self.current()
                } else if index == 0 {
                    Navigation::Home
                } else {
                    if self.service_at(index) == Some(ServiceId::Mortgage) {
                        self.drop_handoff_mortgage();
                    }
                    self.cursor = Cursor::Service(index - 1);
                    self.current()
                }
            }
            Cursor::Contact => match self.services.len().checked_sub(1) {
                Some(last) => {
                    self.cursor = Cursor::Service(last);
                    self.current()
                }
                None => Navigation::Home,
            },
            Cursor::Ready => {
                self.cursor = Cursor::Contact;
                self.current()
            }
            Cursor::Submitted => Navigation::Home,
        };

        debug!(session_id = %self.session_id, ?navigation, "questionnaire moved back");
        navigation
    }

    /// Display approximation: completed services count in full, the current service
    /// contributes its step's table number.
    pub fn progress(&self) -> Progress {
        let counts: Vec<u16> = self.services.iter().map(|s| step_count(s.id)).collect();
        let total = counts.iter().sum::<u16>() + 1;

        let current = match self.cursor {
            Cursor::Service(index) => {
                let completed: u16 = counts.iter().take(index).sum();
                let within = self
                    .flow_at(index)
                    .map(ServiceFlow::progress_number)
                    .unwrap_or(1)
                    .min(counts.get(index).copied().unwrap_or(1));
                completed + within
            }
            Cursor::Contact | Cursor::Ready | Cursor::Submitted => total,
        };

        let percent = ((f64::from(current) / f64::from(total)) * 100.0).round() as u8;
        Progress {
            current,
            total,
            percent,
        }
    }

    /// Affordability estimate for the loan-analysis screen, once income and pricing inputs are
    /// known.
    pub fn loan_analysis(&self) -> Option<AffordabilityEstimate> {
        let state = self.mortgage_state()?;
        let input = AffordabilityInput {
            yearly_income: state.yearly_income?,
            monthly_debts: state.monthly_debts.unwrap_or(0.0),
            credit_score: state.credit_score?,
            loan_program: state.loan_type?,
            occupancy: state.ownership.unwrap_or(Occupancy::Primary),
            down_payment: state.down_payment,
        };
        Some(affordability::estimate(&input))
    }

    /// Payload for the submission endpoint. Only available once contact details are captured.
    pub fn submission(&self) -> Result<LeadSubmission, FlowError> {
        match self.cursor {
            Cursor::Ready => Ok(LeadSubmission {
                session_id: self.session_id.clone(),
                services: self.services.ids(),
                form_data: self.form_data.clone(),
            }),
            Cursor::Submitted => Err(FlowError::Finished),
            Cursor::Service(_) | Cursor::Contact => Err(FlowError::ContactRequired),
        }
    }

    /// Call after the submission endpoint accepted the lead. Clears the mirror and selection.
    pub fn mark_submitted(&mut self) -> Result<(), FlowError> {
        match self.cursor {
            Cursor::Ready => {}
            Cursor::Submitted => return Err(FlowError::Finished),
            Cursor::Service(_) | Cursor::Contact => return Err(FlowError::ContactRequired),
        }

        storage::clear_form_data(self.storage.as_mut());
        self.form_data = FormData::new();
        self.services.clear();
        self.flows.clear();
        self.handoff_mortgage = false;
        self.cursor = Cursor::Submitted;
        info!(session_id = %self.session_id, "questionnaire submitted");
        Ok(())
    }

    fn service_at(&self, index: usize) -> Option<ServiceId> {
        self.services.get(index).map(|service| service.id)
    }

    fn flow_at(&self, index: usize) -> Option<&ServiceFlow> {
        self.service_at(index)
            .and_then(|service| self.flows.get(&service))
    }

    fn submit_service_step(
        &mut self,
        index: usize,
        answer: StepAnswer,
    ) -> Result<Navigation, FlowError> {
        let service = self.service_at(index).ok_or(FlowError::NoServicesSelected)?;
        let flow = self
            .flows
            .entry(service)
            .or_insert_with(|| ServiceFlow::for_service(service));

        let expected = flow.current();
        let received = answer_step(&answer, service);
        if expected != received {
            return Err(FlowError::StepMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            });
        }

        match &answer {
            StepAnswer::Mortgage(inner) => inner.validate()?,
            StepAnswer::RealEstate(inner) => inner.validate()?,
            StepAnswer::Details(inner) => inner.validate(service)?,
            StepAnswer::Contact(inner) => inner.validate()?,
        }

        flow.record(&answer);
        self.form_data
            .merge(FormKey::Service(service), answer.to_fields());

        if flow.forward() {
            return Ok(Navigation::Step(flow.current()));
        }
        Ok(self.leave_service(index, service))
    }

    fn leave_service(&mut self, index: usize, service: ServiceId) -> Navigation {
        let handoff = service == ServiceId::RealEstate
            && self
                .real_estate_state()
                .is_some_and(RealEstateFlowState::hands_off_to_mortgage);
        if handoff
            && self.services.insert_after(
                ServiceId::RealEstate,
                ServiceId::Mortgage.category().clone(),
            )
        {
            self.flows.insert(
                ServiceId::Mortgage,
                ServiceFlow::for_service(ServiceId::Mortgage),
            );
            self.handoff_mortgage = true;
            info!(session_id = %self.session_id, "financed purchase added the mortgage questionnaire");
        } else if service == ServiceId::RealEstate && !handoff {
            self.drop_handoff_mortgage();
        }

        let next = index + 1;
        match self.service_at(next) {
            Some(next_service) => {
                let flow = self
                    .flows
                    .entry(next_service)
                    .or_insert_with(|| ServiceFlow::for_service(next_service));
                flow.restart();
                self.cursor = Cursor::Service(next);
                Navigation::Step(flow.current())
            }
            None => {
                self.cursor = Cursor::Contact;
                Navigation::Step(StepId::Contact)
            }
        }
    }

    fn submit_contact(&mut self, answer: StepAnswer) -> Result<Navigation, FlowError> {
        let StepAnswer::Contact(details) = &answer else {
            return Err(FlowError::StepMismatch {
                expected: StepId::Contact.to_string(),
                received: answer.step_label(),
            });
        };

        details.validate()?;
        self.form_data.merge(FormKey::Contact, answer.to_fields());
        self.cursor = Cursor::Ready;
        Ok(Navigation::Review)
    }

    /// Removes a mortgage that only the handoff added, along with its answers.
    fn drop_handoff_mortgage(&mut self) {
        if !self.handoff_mortgage {
            return;
        }
        self.handoff_mortgage = false;
        self.services.deselect(ServiceId::Mortgage);
        self.flows.remove(&ServiceId::Mortgage);
        self.form_data.remove(FormKey::Service(ServiceId::Mortgage));
        self.mirror();
        info!(session_id = %self.session_id, "dropped the mortgage questionnaire added by the handoff");
    }

    fn mirror(&mut self) {
        storage::save_form_data(self.storage.as_mut(), &self.form_data);
    }
}
