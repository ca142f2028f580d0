use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-generated identifier kept in device storage under `questionnaire-session-id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanPurpose {
    Purchase,
    Refinance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipHistory {
    FirstTimeBuyer,
    CurrentOwner,
    PreviousOwner,
}

/// Self-reported credit bands, best first. The position in `ALL` is the pricing tier index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditScoreRange {
    #[serde(rename = "760+")]
    Excellent,
    #[serde(rename = "740-759")]
    VeryGood,
    #[serde(rename = "720-739")]
    Good,
    #[serde(rename = "700-719")]
    AboveAverage,
    #[serde(rename = "680-699")]
    Average,
    #[serde(rename = "660-679")]
    Fair,
    #[serde(rename = "640-659")]
    BelowAverage,
    #[serde(rename = "620-639")]
    Poor,
    #[serde(rename = "below-620")]
    VeryPoor,
}

impl CreditScoreRange {
    pub const ALL: [CreditScoreRange; 9] = [
        CreditScoreRange::Excellent,
        CreditScoreRange::VeryGood,
        CreditScoreRange::Good,
        CreditScoreRange::AboveAverage,
        CreditScoreRange::Average,
        CreditScoreRange::Fair,
        CreditScoreRange::BelowAverage,
        CreditScoreRange::Poor,
        CreditScoreRange::VeryPoor,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CreditScoreRange::Excellent => "760+",
            CreditScoreRange::VeryGood => "740-759",
            CreditScoreRange::Good => "720-739",
            CreditScoreRange::AboveAverage => "700-719",
            CreditScoreRange::Average => "680-699",
            CreditScoreRange::Fair => "660-679",
            CreditScoreRange::BelowAverage => "640-659",
            CreditScoreRange::Poor => "620-639",
            CreditScoreRange::VeryPoor => "below-620",
        }
    }

    pub fn tier_index(self) -> usize {
        Self::ALL
            .iter()
            .position(|range| *range == self)
            .unwrap_or(Self::ALL.len() - 1)
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|range| range.label() == label.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Primary,
    Secondary,
    Investment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanProgram {
    Conventional,
    #[serde(rename = "FHA")]
    Fha,
    #[serde(rename = "VA")]
    Va,
    #[serde(rename = "USDA")]
    Usda,
    Jumbo,
    #[serde(rename = "DSCR")]
    Dscr,
    #[serde(rename = "Non-QM")]
    NonQm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonQmDocumentation {
    BankStatements,
    ProfitAndLoss,
    AssetDepletion,
    #[serde(rename = "1099")]
    Form1099,
    ForeignNational,
    Itin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LienPosition {
    #[serde(rename = "1st-lien")]
    First,
    #[serde(rename = "2nd-lien")]
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefinanceKind {
    RateAndTerm,
    CashOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscrowChoice {
    Include,
    Waive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RealEstateIntent {
    Buy,
    Sell,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    Land,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurchaseMethod {
    Cash,
    Mortgage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactMethod {
    Phone,
    Email,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_ranges_serialize_as_labels() {
        for range in CreditScoreRange::ALL {
            let encoded = serde_json::to_string(&range).expect("serializes");
            assert_eq!(encoded, format!("\"{}\"", range.label()));
        }
        assert_eq!(CreditScoreRange::VeryGood.tier_index(), 1);
        assert_eq!(
            CreditScoreRange::parse("740-759"),
            Some(CreditScoreRange::VeryGood)
        );
    }

    #[test]
    fn loan_programs_use_industry_spelling() {
        assert_eq!(
            serde_json::to_string(&LoanProgram::NonQm).expect("serializes"),
            "\"Non-QM\""
        );
        let parsed: LoanProgram = serde_json::from_str("\"DSCR\"").expect("parses");
        assert_eq!(parsed, LoanProgram::Dscr);
    }
}
