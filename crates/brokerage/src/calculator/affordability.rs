use serde::{Deserialize, Serialize};

use super::CalculatorError;
use crate::questionnaire::domain::{CreditScoreRange, LoanProgram, Occupancy};

pub const LOAN_TERM_MONTHS: i32 = 360;
pub const ANNUAL_TAX_RATE: f64 = 0.0125;
pub const ANNUAL_INSURANCE_RATE: f64 = 0.005;

/// Maximum debt-to-income ratio lenders accept for a credit band.
pub fn max_dti(credit_score: CreditScoreRange) -> f64 {
    match credit_score {
        CreditScoreRange::Excellent => 0.45,
        CreditScoreRange::VeryGood => 0.43,
        CreditScoreRange::Good => 0.41,
        CreditScoreRange::AboveAverage => 0.40,
        CreditScoreRange::Average => 0.39,
        CreditScoreRange::Fair => 0.38,
        CreditScoreRange::BelowAverage => 0.37,
        CreditScoreRange::Poor | CreditScoreRange::VeryPoor => 0.36,
    }
}

/// Starting annual rate, in percent, before credit and occupancy adjustments.
pub fn base_rate(program: LoanProgram) -> f64 {
    match program {
        LoanProgram::Conventional => 6.875,
        LoanProgram::Fha => 6.5,
        LoanProgram::Va => 6.25,
        LoanProgram::Usda => 6.5,
        LoanProgram::Jumbo => 7.125,
        LoanProgram::Dscr => 7.75,
        LoanProgram::NonQm => 8.25,
    }
}

fn occupancy_adjustment(occupancy: Occupancy) -> f64 {
    match occupancy {
        Occupancy::Primary => 0.0,
        Occupancy::Secondary => 0.30,
        Occupancy::Investment => 0.50,
    }
}

pub fn interest_rate(
    program: LoanProgram,
    credit_score: CreditScoreRange,
    occupancy: Occupancy,
) -> f64 {
    let rate = base_rate(program)
        + 0.1 * credit_score.tier_index() as f64
        + occupancy_adjustment(occupancy);
    (rate * 1000.0).round() / 1000.0
}

/// Monthly payment per dollar borrowed on a fully amortizing loan.
pub fn amortization_factor(annual_rate_percent: f64, months: i32) -> f64 {
    let monthly = annual_rate_percent / 100.0 / 12.0;
    if monthly <= 0.0 {
        return 1.0 / f64::from(months);
    }
    let growth = (1.0 + monthly).powi(months);
    monthly * growth / (growth - 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityInput {
    pub yearly_income: f64,
    #[serde(default)]
    pub monthly_debts: f64,
    pub credit_score: CreditScoreRange,
    pub loan_program: LoanProgram,
    pub occupancy: Occupancy,
    #[serde(default)]
    pub down_payment: Option<f64>,
}

impl AffordabilityInput {
    pub fn validate(&self) -> Result<(), CalculatorError> {
        if !(self.yearly_income.is_finite() && self.yearly_income > 0.0) {
            return Err(CalculatorError::InvalidInput {
                field: "yearlyIncome",
                message: "must be greater than zero",
            });
        }
        if !(self.monthly_debts.is_finite() && self.monthly_debts >= 0.0) {
            return Err(CalculatorError::InvalidInput {
                field: "monthlyDebts",
                message: "cannot be negative",
            });
        }
        if let Some(down) = self.down_payment {
            if !(down.is_finite() && down >= 0.0) {
                return Err(CalculatorError::InvalidInput {
                    field: "downPayment",
                    message: "cannot be negative",
                });
            }
        }
        Ok(())
    }
}

/// Display-ready breakdown for the loan-analysis screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityEstimate {
    pub monthly_income: f64,
    pub max_dti: f64,
    pub available_payment: f64,
    pub interest_rate: f64,
    pub loan_amount: f64,
    pub principal_and_interest: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_purchase_price: Option<f64>,
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Largest loan whose payment, taxes and insurance fit under the DTI ceiling.
pub fn estimate(input: &AffordabilityInput) -> AffordabilityEstimate {
    let monthly_income = input.yearly_income / 12.0;
    let max_dti = max_dti(input.credit_score);
    let available_payment = (monthly_income * max_dti - input.monthly_debts).max(0.0);

    let interest_rate = interest_rate(input.loan_program, input.credit_score, input.occupancy);
    let amortization = amortization_factor(interest_rate, LOAN_TERM_MONTHS);
    let tax_factor = ANNUAL_TAX_RATE / 12.0;
    let insurance_factor = ANNUAL_INSURANCE_RATE / 12.0;

    let loan_amount = (available_payment / (amortization + tax_factor + insurance_factor)).round();

    AffordabilityEstimate {
        monthly_income: cents(monthly_income),
        max_dti,
        available_payment: cents(available_payment),
        interest_rate,
        loan_amount,
        principal_and_interest: cents(loan_amount * amortization),
        monthly_tax: cents(loan_amount * tax_factor),
        monthly_insurance: cents(loan_amount * insurance_factor),
        max_purchase_price: input.down_payment.map(|down| (loan_amount + down).round()),
    }
}
