pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod integrations;
pub mod leads;
pub mod questionnaire;
pub mod selection;
pub mod telemetry;
