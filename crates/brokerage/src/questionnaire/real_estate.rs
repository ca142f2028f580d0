use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::domain::{PurchaseMethod, RealEstateIntent};
use super::steps::RealEstateAnswer;
use super::table::{FlowTable, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RealEstateStep {
    Initial,
    SellType,
    BuyType,
    PurchaseMethod,
    CashPurchase,
    MortgageHandoff,
    SellProperty,
}

impl RealEstateStep {
    pub const fn name(self) -> &'static str {
        match self {
            RealEstateStep::Initial => "initial",
            RealEstateStep::SellType => "sell-type",
            RealEstateStep::BuyType => "buy-type",
            RealEstateStep::PurchaseMethod => "purchase-method",
            RealEstateStep::CashPurchase => "cash-purchase",
            RealEstateStep::MortgageHandoff => "mortgage-handoff",
            RealEstateStep::SellProperty => "sell-property",
        }
    }

    pub const fn progress_number(self) -> u16 {
        match self {
            RealEstateStep::Initial => 1,
            RealEstateStep::SellType | RealEstateStep::BuyType | RealEstateStep::PurchaseMethod => {
                2
            }
            RealEstateStep::CashPurchase
            | RealEstateStep::MortgageHandoff
            | RealEstateStep::SellProperty => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateFlowState {
    pub step: RealEstateStep,
    pub intent: Option<RealEstateIntent>,
    pub purchase_method: Option<PurchaseMethod>,
}

impl Default for RealEstateFlowState {
    fn default() -> Self {
        Self {
            step: table().start(),
            intent: None,
            purchase_method: None,
        }
    }
}

impl RealEstateFlowState {
    pub fn record(&mut self, answer: &RealEstateAnswer) {
        match answer {
            RealEstateAnswer::Initial { intent } => self.intent = *intent,
            RealEstateAnswer::PurchaseMethod { purchase_method } => {
                self.purchase_method = *purchase_method
            }
            _ => {}
        }
    }

    pub fn forward(&mut self) -> bool {
        match table().next(self.step, self) {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

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

    /// The buyer finished the sub-flow by asking for financing.
    pub fn hands_off_to_mortgage(&self) -> bool {
        self.step == RealEstateStep::MortgageHandoff
    }
}

fn buys_only(state: &RealEstateFlowState) -> bool {
    state.intent == Some(RealEstateIntent::Buy)
}

fn sells_only(state: &RealEstateFlowState) -> bool {
    state.intent == Some(RealEstateIntent::Sell)
}

fn buys_and_sells(state: &RealEstateFlowState) -> bool {
    state.intent == Some(RealEstateIntent::Both)
}

fn sells_at_all(state: &RealEstateFlowState) -> bool {
    sells_only(state) || buys_and_sells(state)
}

fn pays_cash(state: &RealEstateFlowState) -> bool {
    state.purchase_method == Some(PurchaseMethod::Cash)
}

fn finances(state: &RealEstateFlowState) -> bool {
    state.purchase_method == Some(PurchaseMethod::Mortgage)
}

pub fn table() -> &'static FlowTable<RealEstateStep, RealEstateFlowState> {
    static TABLE: OnceLock<FlowTable<RealEstateStep, RealEstateFlowState>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use RealEstateStep as Step;
        FlowTable::new(
            Step::Initial,
            vec![
                Transition::new(Step::Initial, Step::PurchaseMethod, buys_only),
                Transition::new(Step::Initial, Step::SellType, sells_at_all),
                Transition::new(Step::SellType, Step::SellProperty, sells_only),
                Transition::new(Step::SellType, Step::BuyType, buys_and_sells),
                Transition::new(Step::BuyType, Step::PurchaseMethod, buys_and_sells),
                Transition::new(Step::PurchaseMethod, Step::CashPurchase, pays_cash),
                Transition::new(Step::PurchaseMethod, Step::MortgageHandoff, finances),
            ],
        )
    })
}
