use crate::catalog::ServiceId;
use crate::questionnaire::domain::{
    ContactMethod, CreditScoreRange, EscrowChoice, LienPosition, LoanProgram, LoanPurpose,
    NonQmDocumentation, Occupancy, OwnershipHistory, PropertyKind, PurchaseMethod,
    RealEstateIntent, RefinanceKind,
};
use crate::questionnaire::{
    ContactDetails, MemoryStorage, MortgageAnswer, MortgageStep, Navigation, QuestionnaireFlow,
    RealEstateAnswer, RealEstateStep, ServiceDetails, StepAnswer, StepId,
};
use crate::selection::SelectedServices;

/// Choices that decide which mortgage branch gets walked.
#[derive(Debug, Clone, Copy)]
pub(super) struct MortgageProfile {
    pub purpose: LoanPurpose,
    pub lien: LienPosition,
    pub refinance: RefinanceKind,
    pub ownership: Occupancy,
    pub loan_type: LoanProgram,
}

impl MortgageProfile {
    pub fn purchase(ownership: Occupancy, loan_type: LoanProgram) -> Self {
        Self {
            purpose: LoanPurpose::Purchase,
            lien: LienPosition::First,
            refinance: RefinanceKind::RateAndTerm,
            ownership,
            loan_type,
        }
    }

    pub fn refinance(lien: LienPosition, loan_type: LoanProgram) -> Self {
        Self {
            purpose: LoanPurpose::Refinance,
            lien,
            refinance: RefinanceKind::CashOut,
            ownership: Occupancy::Primary,
            loan_type,
        }
    }
}

pub(super) fn mortgage_answer(step: MortgageStep, profile: &MortgageProfile) -> MortgageAnswer {
    match step {
        MortgageStep::Type => MortgageAnswer::Type {
            purpose: Some(profile.purpose),
        },
        MortgageStep::HomeOwnershipHistory => MortgageAnswer::HomeOwnershipHistory {
            ownership_history: Some(OwnershipHistory::FirstTimeBuyer),
        },
        MortgageStep::CreditScore => MortgageAnswer::CreditScore {
            credit_score: Some(CreditScoreRange::VeryGood),
        },
        MortgageStep::Location => MortgageAnswer::Location {
            address: "4102 W Bay Ave, Tampa, FL 33616".to_string(),
            place_id: Some("ChIJtampa".to_string()),
            city: Some("Tampa".to_string()),
            zip_code: Some("33616".to_string()),
        },
        MortgageStep::Ownership => MortgageAnswer::Ownership {
            ownership_type: Some(profile.ownership),
        },
        MortgageStep::LoanType => MortgageAnswer::LoanType {
            loan_type: Some(profile.loan_type),
        },
        MortgageStep::NonQm => MortgageAnswer::NonQm {
            documentation_types: vec![NonQmDocumentation::BankStatements],
        },
        MortgageStep::LenderPrice => MortgageAnswer::LenderPrice {
            property_value: Some(450_000.0),
            down_payment: Some(90_000.0),
        },
        MortgageStep::Income => MortgageAnswer::Income {
            yearly_income: Some(120_000.0),
            monthly_debts: Some(500.0),
        },
        MortgageStep::Plaid => MortgageAnswer::Plaid {
            accounts_linked: false,
            institution: None,
        },
        MortgageStep::TaxesInsurance => MortgageAnswer::TaxesInsurance {
            annual_property_tax: Some(5_400.0),
            annual_insurance: Some(2_900.0),
        },
        MortgageStep::LoanAnalysis => MortgageAnswer::LoanAnalysis {
            wants_preapproval: Some(true),
        },
        MortgageStep::RefinanceLienType => MortgageAnswer::RefinanceLienType {
            lien_type: Some(profile.lien),
        },
        MortgageStep::LoanBalance => MortgageAnswer::LoanBalance {
            loan_balance: Some(212_000.0),
        },
        MortgageStep::RefinanceType => MortgageAnswer::RefinanceType {
            refinance_type: Some(profile.refinance),
            cash_out_amount: Some(40_000.0),
        },
        MortgageStep::Escrow => MortgageAnswer::Escrow {
            escrow: Some(EscrowChoice::Include),
        },
    }
}

/// Choices that decide which real-estate branch gets walked.
#[derive(Debug, Clone, Copy)]
pub(super) struct RealEstateProfile {
    pub intent: RealEstateIntent,
    pub method: PurchaseMethod,
}

pub(super) fn real_estate_answer(
    step: RealEstateStep,
    profile: &RealEstateProfile,
) -> RealEstateAnswer {
    match step {
        RealEstateStep::Initial => RealEstateAnswer::Initial {
            intent: Some(profile.intent),
        },
        RealEstateStep::SellType => RealEstateAnswer::SellType {
            sell_property_type: Some(PropertyKind::Condo),
            timeline: Some("3-6 months".to_string()),
        },
        RealEstateStep::BuyType => RealEstateAnswer::BuyType {
            buy_property_type: Some(PropertyKind::SingleFamily),
            price_range: Some("400k-500k".to_string()),
        },
        RealEstateStep::PurchaseMethod => RealEstateAnswer::PurchaseMethod {
            purchase_method: Some(profile.method),
        },
        RealEstateStep::CashPurchase => RealEstateAnswer::CashPurchase {
            cash_budget: Some(380_000.0),
            proof_of_funds: true,
        },
        RealEstateStep::MortgageHandoff => RealEstateAnswer::MortgageHandoff {
            preapproved: Some(false),
        },
        RealEstateStep::SellProperty => RealEstateAnswer::SellProperty {
            sell_address: "918 S Dakota Ave, Tampa, FL 33606".to_string(),
            estimated_value: Some(365_000.0),
        },
    }
}

pub(super) fn details_for(service: ServiceId) -> ServiceDetails {
    ServiceDetails {
        selected_options: vec![service.category().options[0].to_string()],
        property_address: Some("4102 W Bay Ave, Tampa, FL 33616".to_string()),
        notes: None,
    }
}

pub(super) fn contact() -> ContactDetails {
    ContactDetails {
        first_name: "Dana".to_string(),
        last_name: "Reyes".to_string(),
        email: "dana.reyes@example.com".to_string(),
        phone: "(813) 555-0142".to_string(),
        preferred_contact: Some(ContactMethod::Email),
    }
}

pub(super) fn start_flow(services: &[ServiceId]) -> QuestionnaireFlow {
    QuestionnaireFlow::start(
        SelectedServices::from_ids(services.iter().copied()),
        Box::new(MemoryStorage::new()),
    )
    .expect("flow starts")
}

pub(super) fn current_step(flow: &QuestionnaireFlow) -> StepId {
    match flow.current() {
        Navigation::Step(step) => step,
        other => panic!("expected a step, got {other:?}"),
    }
}

/// Answers mortgage steps until the flow leaves the mortgage service, returning each step seen.
pub(super) fn walk_mortgage(
    flow: &mut QuestionnaireFlow,
    profile: &MortgageProfile,
) -> Vec<MortgageStep> {
    let mut visited = Vec::new();
    while let Navigation::Step(StepId::Mortgage(step)) = flow.current() {
        visited.push(step);
        flow.submit(StepAnswer::Mortgage(mortgage_answer(step, profile)))
            .unwrap_or_else(|err| panic!("mortgage step {step:?} rejected: {err}"));
        assert!(visited.len() <= 16, "mortgage walk did not terminate");
    }
    visited
}

pub(super) fn walk_real_estate(
    flow: &mut QuestionnaireFlow,
    profile: &RealEstateProfile,
) -> Vec<RealEstateStep> {
    let mut visited = Vec::new();
    while let Navigation::Step(StepId::RealEstate(step)) = flow.current() {
        visited.push(step);
        flow.submit(StepAnswer::RealEstate(real_estate_answer(step, profile)))
            .unwrap_or_else(|err| panic!("real estate step {step:?} rejected: {err}"));
        assert!(visited.len() <= 7, "real estate walk did not terminate");
    }
    visited
}

pub(super) fn answer_details(flow: &mut QuestionnaireFlow) -> Navigation {
    let StepId::Details(service) = current_step(flow) else {
        panic!("expected a details step");
    };
    flow.submit(StepAnswer::Details(details_for(service)))
        .expect("details accepted")
}
