//! Answers collected by each questionnaire step and the minimal checks that gate advancement.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::domain::{
    ContactMethod, CreditScoreRange, EscrowChoice, LienPosition, LoanProgram, LoanPurpose,
    NonQmDocumentation, Occupancy, OwnershipHistory, PropertyKind, PurchaseMethod,
    RealEstateIntent, RefinanceKind,
};
use super::mortgage::MortgageStep;
use super::real_estate::RealEstateStep;
use crate::catalog::ServiceId;

/// Field-level message shown inline next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct StepValidationError {
    pub field: &'static str,
    pub message: String,
}

impl StepValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn require<T: Copy>(
    value: Option<T>,
    field: &'static str,
    message: &str,
) -> Result<T, StepValidationError> {
    value.ok_or_else(|| StepValidationError::new(field, message))
}

fn require_positive(
    value: Option<f64>,
    field: &'static str,
    message: &str,
) -> Result<f64, StepValidationError> {
    match value {
        Some(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(StepValidationError::new(field, message)),
    }
}

fn require_non_negative(value: Option<f64>, field: &'static str) -> Result<(), StepValidationError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(StepValidationError::new(
            field,
            "amount cannot be negative",
        )),
        _ => Ok(()),
    }
}

fn require_text(value: &str, field: &'static str, message: &str) -> Result<(), StepValidationError> {
    if value.trim().is_empty() {
        Err(StepValidationError::new(field, message))
    } else {
        Ok(())
    }
}

/// Mortgage answers. Serialized untagged so only the fields land in the form-data slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum MortgageAnswer {
    Type {
        #[serde(skip_serializing_if = "Option::is_none")]
        purpose: Option<LoanPurpose>,
    },
    HomeOwnershipHistory {
        #[serde(skip_serializing_if = "Option::is_none")]
        ownership_history: Option<OwnershipHistory>,
    },
    CreditScore {
        #[serde(skip_serializing_if = "Option::is_none")]
        credit_score: Option<CreditScoreRange>,
    },
    Location {
        address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        place_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        city: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        zip_code: Option<String>,
    },
    Ownership {
        #[serde(skip_serializing_if = "Option::is_none")]
        ownership_type: Option<Occupancy>,
    },
    LoanType {
        #[serde(skip_serializing_if = "Option::is_none")]
        loan_type: Option<LoanProgram>,
    },
    NonQm {
        documentation_types: Vec<NonQmDocumentation>,
    },
    LenderPrice {
        #[serde(skip_serializing_if = "Option::is_none")]
        property_value: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        down_payment: Option<f64>,
    },
    Income {
        #[serde(skip_serializing_if = "Option::is_none")]
        yearly_income: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        monthly_debts: Option<f64>,
    },
    Plaid {
        accounts_linked: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        institution: Option<String>,
    },
    TaxesInsurance {
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_property_tax: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_insurance: Option<f64>,
    },
    LoanAnalysis {
        #[serde(skip_serializing_if = "Option::is_none")]
        wants_preapproval: Option<bool>,
    },
    RefinanceLienType {
        #[serde(skip_serializing_if = "Option::is_none")]
        lien_type: Option<LienPosition>,
    },
    LoanBalance {
        #[serde(skip_serializing_if = "Option::is_none")]
        loan_balance: Option<f64>,
    },
    RefinanceType {
        #[serde(skip_serializing_if = "Option::is_none")]
        refinance_type: Option<RefinanceKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cash_out_amount: Option<f64>,
    },
    Escrow {
        #[serde(skip_serializing_if = "Option::is_none")]
        escrow: Option<EscrowChoice>,
    },
}

impl MortgageAnswer {
    pub fn step(&self) -> MortgageStep {
        match self {
            MortgageAnswer::Type { .. } => MortgageStep::Type,
            MortgageAnswer::HomeOwnershipHistory { .. } => MortgageStep::HomeOwnershipHistory,
            MortgageAnswer::CreditScore { .. } => MortgageStep::CreditScore,
            MortgageAnswer::Location { .. } => MortgageStep::Location,
            MortgageAnswer::Ownership { .. } => MortgageStep::Ownership,
            MortgageAnswer::LoanType { .. } => MortgageStep::LoanType,
            MortgageAnswer::NonQm { .. } => MortgageStep::NonQm,
            MortgageAnswer::LenderPrice { .. } => MortgageStep::LenderPrice,
            MortgageAnswer::Income { .. } => MortgageStep::Income,
            MortgageAnswer::Plaid { .. } => MortgageStep::Plaid,
            MortgageAnswer::TaxesInsurance { .. } => MortgageStep::TaxesInsurance,
            MortgageAnswer::LoanAnalysis { .. } => MortgageStep::LoanAnalysis,
            MortgageAnswer::RefinanceLienType { .. } => MortgageStep::RefinanceLienType,
            MortgageAnswer::LoanBalance { .. } => MortgageStep::LoanBalance,
            MortgageAnswer::RefinanceType { .. } => MortgageStep::RefinanceType,
            MortgageAnswer::Escrow { .. } => MortgageStep::Escrow,
        }
    }

    pub fn validate(&self) -> Result<(), StepValidationError> {
        match self {
            MortgageAnswer::Type { purpose } => {
                require(*purpose, "purpose", "choose purchase or refinance").map(drop)
            }
            MortgageAnswer::HomeOwnershipHistory { ownership_history } => require(
                *ownership_history,
                "ownershipHistory",
                "tell us whether you have owned a home before",
            )
            .map(drop),
            MortgageAnswer::CreditScore { credit_score } => {
                require(*credit_score, "creditScore", "select a credit score range").map(drop)
            }
            MortgageAnswer::Location { address, .. } => {
                require_text(address, "address", "enter the property location")
            }
            MortgageAnswer::Ownership { ownership_type } => require(
                *ownership_type,
                "ownershipType",
                "select how the property will be used",
            )
            .map(drop),
            MortgageAnswer::LoanType { loan_type } => {
                require(*loan_type, "loanType", "select a loan type").map(drop)
            }
            MortgageAnswer::NonQm {
                documentation_types,
            } => {
                if documentation_types.is_empty() {
                    Err(StepValidationError::new(
                        "documentationTypes",
                        "select at least one type",
                    ))
                } else {
                    Ok(())
                }
            }
            MortgageAnswer::LenderPrice {
                property_value,
                down_payment,
            } => {
                let value =
                    require_positive(*property_value, "propertyValue", "enter a property value")?;
                require_non_negative(*down_payment, "downPayment")?;
                if down_payment.is_some_and(|down| down >= value) {
                    return Err(StepValidationError::new(
                        "downPayment",
                        "down payment must be less than the property value",
                    ));
                }
                Ok(())
            }
            MortgageAnswer::Income {
                yearly_income,
                monthly_debts,
            } => {
                require_positive(*yearly_income, "yearlyIncome", "enter your yearly income")?;
                require_non_negative(*monthly_debts, "monthlyDebts")
            }
            MortgageAnswer::Plaid { .. } => Ok(()),
            MortgageAnswer::TaxesInsurance {
                annual_property_tax,
                annual_insurance,
            } => {
                require_non_negative(*annual_property_tax, "annualPropertyTax")?;
                require_non_negative(*annual_insurance, "annualInsurance")
            }
            MortgageAnswer::LoanAnalysis { wants_preapproval } => require(
                *wants_preapproval,
                "wantsPreapproval",
                "let us know if you want a pre-approval",
            )
            .map(drop),
            MortgageAnswer::RefinanceLienType { lien_type } => {
                require(*lien_type, "lienType", "select which lien to refinance").map(drop)
            }
            MortgageAnswer::LoanBalance { loan_balance } => require_positive(
                *loan_balance,
                "loanBalance",
                "enter your current loan balance",
            )
            .map(drop),
            MortgageAnswer::RefinanceType {
                refinance_type,
                cash_out_amount,
            } => {
                let kind = require(*refinance_type, "refinanceType", "select a refinance type")?;
                if kind == RefinanceKind::CashOut {
                    require_positive(
                        *cash_out_amount,
                        "cashOutAmount",
                        "enter how much cash you want to take out",
                    )?;
                }
                Ok(())
            }
            MortgageAnswer::Escrow { escrow } => {
                require(*escrow, "escrow", "select an escrow option").map(drop)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum RealEstateAnswer {
    Initial {
        #[serde(skip_serializing_if = "Option::is_none")]
        intent: Option<RealEstateIntent>,
    },
    SellType {
        #[serde(skip_serializing_if = "Option::is_none")]
        sell_property_type: Option<PropertyKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timeline: Option<String>,
    },
    BuyType {
        #[serde(skip_serializing_if = "Option::is_none")]
        buy_property_type: Option<PropertyKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        price_range: Option<String>,
    },
    PurchaseMethod {
        #[serde(skip_serializing_if = "Option::is_none")]
        purchase_method: Option<PurchaseMethod>,
    },
    CashPurchase {
        #[serde(skip_serializing_if = "Option::is_none")]
        cash_budget: Option<f64>,
        proof_of_funds: bool,
    },
    MortgageHandoff {
        #[serde(skip_serializing_if = "Option::is_none")]
        preapproved: Option<bool>,
    },
    SellProperty {
        sell_address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        estimated_value: Option<f64>,
    },
}

impl RealEstateAnswer {
    pub fn step(&self) -> RealEstateStep {
        match self {
            RealEstateAnswer::Initial { .. } => RealEstateStep::Initial,
            RealEstateAnswer::SellType { .. } => RealEstateStep::SellType,
            RealEstateAnswer::BuyType { .. } => RealEstateStep::BuyType,
            RealEstateAnswer::PurchaseMethod { .. } => RealEstateStep::PurchaseMethod,
            RealEstateAnswer::CashPurchase { .. } => RealEstateStep::CashPurchase,
            RealEstateAnswer::MortgageHandoff { .. } => RealEstateStep::MortgageHandoff,
            RealEstateAnswer::SellProperty { .. } => RealEstateStep::SellProperty,
        }
    }

    pub fn validate(&self) -> Result<(), StepValidationError> {
        match self {
            RealEstateAnswer::Initial { intent } => {
                require(*intent, "intent", "choose buy, sell, or both").map(drop)
            }
            RealEstateAnswer::SellType {
                sell_property_type, ..
            } => require(
                *sell_property_type,
                "sellPropertyType",
                "select the type of property you are selling",
            )
            .map(drop),
            RealEstateAnswer::BuyType {
                buy_property_type, ..
            } => require(
                *buy_property_type,
                "buyPropertyType",
                "select the type of property you want to buy",
            )
            .map(drop),
            RealEstateAnswer::PurchaseMethod { purchase_method } => require(
                *purchase_method,
                "purchaseMethod",
                "choose cash or mortgage",
            )
            .map(drop),
            RealEstateAnswer::CashPurchase { cash_budget, .. } => {
                require_positive(*cash_budget, "cashBudget", "enter your purchase budget")
                    .map(drop)
            }
            RealEstateAnswer::MortgageHandoff { preapproved } => require(
                *preapproved,
                "preapproved",
                "let us know if you are already pre-approved",
            )
            .map(drop),
            RealEstateAnswer::SellProperty {
                sell_address,
                estimated_value,
            } => {
                require_text(sell_address, "sellAddress", "enter the property address")?;
                require_non_negative(*estimated_value, "estimatedValue")
            }
        }
    }
}

/// Single-step answer used by the service lines without a dedicated sub-flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetails {
    pub selected_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServiceDetails {
    pub fn validate(&self, service: ServiceId) -> Result<(), StepValidationError> {
        if self.selected_options.is_empty() {
            return Err(StepValidationError::new(
                "selectedOptions",
                "select at least one option",
            ));
        }

        let offered = service.category().options;
        if let Some(unknown) = self
            .selected_options
            .iter()
            .find(|option| !offered.contains(&option.as_str()))
        {
            return Err(StepValidationError::new(
                "selectedOptions",
                format!("'{unknown}' is not offered for {}", service.category().display_name),
            ));
        }
        Ok(())
    }
}

/// Terminal step of every questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_contact: Option<ContactMethod>,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        Regex::new(r"^\+?[0-9()\-.\s]{10,20}$").expect("valid phone regex")
    })
}

impl ContactDetails {
    /// Every failing field, in display order.
    pub fn field_errors(&self) -> Vec<StepValidationError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(StepValidationError::new("firstName", "enter your first name"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(StepValidationError::new("lastName", "enter your last name"));
        }
        if !email_pattern().is_match(self.email.trim()) {
            errors.push(StepValidationError::new(
                "email",
                "enter a valid email address",
            ));
        }
        let digits = self.phone.chars().filter(char::is_ascii_digit).count();
        if !phone_pattern().is_match(self.phone.trim()) || digits < 10 {
            errors.push(StepValidationError::new(
                "phone",
                "enter a valid phone number",
            ));
        }
        errors
    }

    pub fn validate(&self) -> Result<(), StepValidationError> {
        match self.field_errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Whatever the current step's form hands back on confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAnswer {
    Mortgage(MortgageAnswer),
    RealEstate(RealEstateAnswer),
    Details(ServiceDetails),
    Contact(ContactDetails),
}

impl StepAnswer {
    /// Name of the step this answer belongs to, qualified by service for sub-flows.
    pub fn step_label(&self) -> String {
        match self {
            StepAnswer::Mortgage(answer) => {
                format!("{}/{}", ServiceId::Mortgage, answer.step().name())
            }
            StepAnswer::RealEstate(answer) => {
                format!("{}/{}", ServiceId::RealEstate, answer.step().name())
            }
            StepAnswer::Details(_) => "details".to_string(),
            StepAnswer::Contact(_) => "contact".to_string(),
        }
    }

    pub(crate) fn to_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let value = match self {
            StepAnswer::Mortgage(answer) => serde_json::to_value(answer),
            StepAnswer::RealEstate(answer) => serde_json::to_value(answer),
            StepAnswer::Details(answer) => serde_json::to_value(answer),
            StepAnswer::Contact(answer) => serde_json::to_value(answer),
        };
        match value {
            Ok(serde_json::Value::Object(fields)) => fields,
            _ => serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            email: "dana.reyes@example.com".to_string(),
            phone: "(813) 555-0142".to_string(),
            preferred_contact: Some(ContactMethod::Text),
        }
    }

    #[test]
    fn escrow_requires_a_selection() {
        let empty = MortgageAnswer::Escrow { escrow: None };
        let err = empty.validate().expect_err("escrow choice is required");
        assert_eq!(err.field, "escrow");

        let chosen = MortgageAnswer::Escrow {
            escrow: Some(EscrowChoice::Include),
        };
        assert!(chosen.validate().is_ok());
    }

    #[test]
    fn unanswered_optional_fields_stay_out_of_the_slice() {
        let fields = StepAnswer::Mortgage(MortgageAnswer::Location {
            address: "4102 W Bay Ave, Tampa, FL 33616".to_string(),
            place_id: None,
            city: Some("Tampa".to_string()),
            zip_code: None,
        })
        .to_fields();
        assert_eq!(
            fields.get("address").and_then(|v| v.as_str()),
            Some("4102 W Bay Ave, Tampa, FL 33616")
        );
        assert_eq!(fields.get("city").and_then(|v| v.as_str()), Some("Tampa"));
        assert!(!fields.contains_key("placeId"));
        assert!(!fields.contains_key("zipCode"));

        let fields = StepAnswer::RealEstate(RealEstateAnswer::CashPurchase {
            cash_budget: None,
            proof_of_funds: true,
        })
        .to_fields();
        assert!(!fields.contains_key("cashBudget"));
        assert_eq!(
            fields.get("proofOfFunds"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn loan_balance_requires_a_positive_amount() {
        for balance in [None, Some(0.0), Some(-12.0), Some(f64::NAN)] {
            let answer = MortgageAnswer::LoanBalance {
                loan_balance: balance,
            };
            assert_eq!(
                answer.validate().expect_err("balance rejected").field,
                "loanBalance"
            );
        }
        assert!(MortgageAnswer::LoanBalance {
            loan_balance: Some(212_000.0)
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn non_qm_requires_at_least_one_type() {
        let empty = MortgageAnswer::NonQm {
            documentation_types: Vec::new(),
        };
        let err = empty.validate().expect_err("documentation is required");
        assert_eq!(err.message, "select at least one type");

        let chosen = MortgageAnswer::NonQm {
            documentation_types: vec![NonQmDocumentation::BankStatements],
        };
        assert!(chosen.validate().is_ok());
    }

    #[test]
    fn cash_out_refinance_needs_an_amount() {
        let answer = MortgageAnswer::RefinanceType {
            refinance_type: Some(RefinanceKind::CashOut),
            cash_out_amount: None,
        };
        assert_eq!(
            answer.validate().expect_err("amount required").field,
            "cashOutAmount"
        );
    }

    #[test]
    fn answers_serialize_to_plain_field_objects() {
        let answer = StepAnswer::Mortgage(MortgageAnswer::LoanType {
            loan_type: Some(LoanProgram::Dscr),
        });
        let fields = answer.to_fields();
        assert_eq!(fields.get("loanType"), Some(&serde_json::json!("DSCR")));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn contact_rejects_invalid_email() {
        let mut details = contact();
        assert!(details.validate().is_ok());

        details.email = "dana.reyes@".to_string();
        let err = details.validate().expect_err("email is invalid");
        assert_eq!(err.field, "email");
    }

    #[test]
    fn contact_reports_every_failing_field() {
        let details = ContactDetails {
            first_name: " ".to_string(),
            last_name: String::new(),
            email: "nope".to_string(),
            phone: "555".to_string(),
            preferred_contact: None,
        };
        let fields: Vec<_> = details.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["firstName", "lastName", "email", "phone"]);
    }

    #[test]
    fn service_details_only_accept_catalog_options() {
        let details = ServiceDetails {
            selected_options: vec!["Flood".to_string(), "Earthquake".to_string()],
            property_address: None,
            notes: None,
        };
        let err = details
            .validate(ServiceId::Insurance)
            .expect_err("earthquake is not offered");
        assert!(err.message.contains("Earthquake"));
    }
}
