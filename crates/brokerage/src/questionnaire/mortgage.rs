use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::domain::{
    CreditScoreRange, LienPosition, LoanProgram, LoanPurpose, Occupancy,
};
use super::steps::MortgageAnswer;
use super::table::{always, FlowTable, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MortgageStep {
    Type,
    HomeOwnershipHistory,
    CreditScore,
    Location,
    Ownership,
    LoanType,
    NonQm,
    LenderPrice,
    Income,
    Plaid,
    TaxesInsurance,
    LoanAnalysis,
    RefinanceLienType,
    LoanBalance,
    RefinanceType,
    Escrow,
}

impl MortgageStep {
    pub const fn name(self) -> &'static str {
        match self {
            MortgageStep::Type => "type",
            MortgageStep::HomeOwnershipHistory => "home-ownership-history",
            MortgageStep::CreditScore => "credit-score",
            MortgageStep::Location => "location",
            MortgageStep::Ownership => "ownership",
            MortgageStep::LoanType => "loan-type",
            MortgageStep::NonQm => "non-qm",
            MortgageStep::LenderPrice => "lender-price",
            MortgageStep::Income => "income",
            MortgageStep::Plaid => "plaid",
            MortgageStep::TaxesInsurance => "taxes-insurance",
            MortgageStep::LoanAnalysis => "loan-analysis",
            MortgageStep::RefinanceLienType => "refinance-lien-type",
            MortgageStep::LoanBalance => "loan-balance",
            MortgageStep::RefinanceType => "refinance-type",
            MortgageStep::Escrow => "escrow",
        }
    }

    /// Display position used by the progress bar. Approximate on the refinance branch.
    pub const fn progress_number(self) -> u16 {
        match self {
            MortgageStep::Type => 1,
            MortgageStep::HomeOwnershipHistory | MortgageStep::RefinanceLienType => 2,
            MortgageStep::CreditScore => 3,
            MortgageStep::Location | MortgageStep::LoanBalance | MortgageStep::RefinanceType => 4,
            MortgageStep::Ownership | MortgageStep::Escrow => 5,
            MortgageStep::LoanType | MortgageStep::NonQm => 6,
            MortgageStep::LenderPrice => 7,
            MortgageStep::Income => 8,
            MortgageStep::Plaid => 9,
            MortgageStep::TaxesInsurance | MortgageStep::LoanAnalysis => 10,
        }
    }
}

/// Branch descriptor for the mortgage sub-flow. Rebuilt from scratch when lost.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageFlowState {
    pub step: MortgageStep,
    pub purpose: Option<LoanPurpose>,
    pub credit_score: Option<CreditScoreRange>,
    pub lien: Option<LienPosition>,
    pub ownership: Option<Occupancy>,
    pub loan_type: Option<LoanProgram>,
    pub yearly_income: Option<f64>,
    pub monthly_debts: Option<f64>,
    pub down_payment: Option<f64>,
}

impl Default for MortgageFlowState {
    fn default() -> Self {
        Self {
            step: table().start(),
            purpose: None,
            credit_score: None,
            lien: None,
            ownership: None,
            loan_type: None,
            yearly_income: None,
            monthly_debts: None,
            down_payment: None,
        }
    }
}

impl MortgageFlowState {
    /// Records the branch-relevant parts of an answer for the current step.
    pub fn record(&mut self, answer: &MortgageAnswer) {
        match answer {
            MortgageAnswer::Type { purpose } => self.purpose = *purpose,
            MortgageAnswer::CreditScore { credit_score } => self.credit_score = *credit_score,
            MortgageAnswer::Ownership { ownership_type } => self.ownership = *ownership_type,
            MortgageAnswer::LoanType { loan_type } => self.loan_type = *loan_type,
            MortgageAnswer::RefinanceLienType { lien_type } => self.lien = *lien_type,
            MortgageAnswer::LenderPrice { down_payment, .. } => self.down_payment = *down_payment,
            MortgageAnswer::Income {
                yearly_income,
                monthly_debts,
            } => {
                self.yearly_income = *yearly_income;
                self.monthly_debts = *monthly_debts;
            }
            _ => {}
        }
    }

    /// Moves to the next step; `false` means the sub-flow is finished.
    pub fn forward(&mut self) -> bool {
        match table().next(self.step, self) {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Moves to the previous step; `false` means this is already the first step.
    pub fn backward(&mut self) -> bool {
        match table().previous(self.step, self) {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn restart(&mut self) {
        self.step = table().start();
    }
}

fn is_purchase(state: &MortgageFlowState) -> bool {
    state.purpose == Some(LoanPurpose::Purchase)
}

fn is_refinance(state: &MortgageFlowState) -> bool {
    state.purpose == Some(LoanPurpose::Refinance)
}

fn refinances_first_lien(state: &MortgageFlowState) -> bool {
    is_refinance(state) && state.lien == Some(LienPosition::First)
}

fn refinances_other_lien(state: &MortgageFlowState) -> bool {
    is_refinance(state) && state.lien != Some(LienPosition::First)
}

fn purchase_non_qm(state: &MortgageFlowState) -> bool {
    is_purchase(state) && state.loan_type == Some(LoanProgram::NonQm)
}

fn skips_non_qm(state: &MortgageFlowState) -> bool {
    !purchase_non_qm(state)
}

pub fn table() -> &'static FlowTable<MortgageStep, MortgageFlowState> {
    static TABLE: OnceLock<FlowTable<MortgageStep, MortgageFlowState>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use MortgageStep::*;
        FlowTable::new(
            Type,
            vec![
                Transition::new(Type, HomeOwnershipHistory, is_purchase),
                Transition::new(HomeOwnershipHistory, CreditScore, is_purchase),
                Transition::new(CreditScore, Location, is_purchase),
                Transition::new(Location, Ownership, is_purchase),
                Transition::new(Ownership, LoanType, is_purchase),
                Transition::new(LoanType, NonQm, purchase_non_qm),
                Transition::new(NonQm, LenderPrice, purchase_non_qm),
                Transition::new(LoanType, LenderPrice, skips_non_qm),
                Transition::new(Type, RefinanceLienType, is_refinance),
                Transition::new(RefinanceLienType, CreditScore, is_refinance),
                Transition::new(CreditScore, LoanBalance, is_refinance),
                Transition::new(LoanBalance, RefinanceType, refinances_first_lien),
                Transition::new(RefinanceType, Escrow, refinances_first_lien),
                Transition::new(LoanBalance, Escrow, refinances_other_lien),
                Transition::new(Escrow, Location, is_refinance),
                Transition::new(Location, LoanType, is_refinance),
                Transition::new(LenderPrice, Income, always),
                Transition::new(Income, Plaid, always),
                Transition::new(Plaid, TaxesInsurance, always),
                Transition::new(TaxesInsurance, LoanAnalysis, always),
            ],
        )
    })
}
