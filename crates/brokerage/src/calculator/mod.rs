//! Mortgage affordability and property-tax estimates.

pub mod address;
pub mod affordability;
pub mod tax;

#[cfg(test)]
mod tests;

pub use address::{AddressEstimate, AddressEstimateRequest, AddressEstimator};
pub use affordability::{estimate, AffordabilityEstimate, AffordabilityInput};
pub use tax::{FlatRateTable, TaxEstimate, TaxSource};

/// Input rejected before any estimate is attempted.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
pub enum CalculatorError {
    #[error("{field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: &'static str,
    },
    #[error("property value unknown for '{0}'; provide an estimated value")]
    ValueUnavailable(String),
}
