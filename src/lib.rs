//! Churn Prediction Service Library
//!
//! Collects telecom usage attributes from a web form, derives the engineered
//! features, queries a pre-trained ensemble classifier and explains the
//! result with a small set of threshold rules.

pub mod config;
pub mod error;
pub mod explanation;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod server;
pub mod types;
pub mod views;

pub use config::AppConfig;
pub use error::{ChurnError, ErrorKind};
pub use explanation::ExplanationEngine;
pub use feature_extractor::{DerivedFeatures, FeatureExtractor, FeatureVector};
pub use models::{Classifier, InferenceEngine, OnnxEnsemble};
pub use predictor::ChurnPredictor;
pub use types::{customer::RawInput, prediction::PredictionResult};
