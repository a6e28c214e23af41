//! Type definitions for the churn prediction service

pub mod customer;
pub mod prediction;

pub use customer::{CustomerRecord, RawInput};
pub use prediction::{ChurnLabel, Finding, PredictionResult};
