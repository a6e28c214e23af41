//! End-to-end prediction for one form submission

use crate::error::ChurnError;
use crate::explanation::ExplanationEngine;
use crate::feature_extractor::FeatureExtractor;
use crate::models::classifier::Classifier;
use crate::models::inference::InferenceEngine;
use crate::types::customer::RawInput;
use crate::types::prediction::PredictionResult;
use std::sync::Arc;
use tracing::{info, info_span, warn};

/// Feature building, inference and explanation, run in sequence.
pub struct ChurnPredictor {
    extractor: FeatureExtractor,
    inference: InferenceEngine,
    explainer: ExplanationEngine,
}

impl ChurnPredictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            inference: InferenceEngine::new(classifier),
            explainer: ExplanationEngine::new(),
        }
    }

    pub fn feature_extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Predict churn for a raw form submission. The first failing stage
    /// aborts the request.
    pub fn predict(&self, raw: &RawInput) -> Result<PredictionResult, ChurnError> {
        let request_id = uuid::Uuid::new_v4();
        let _span = info_span!("prediction", %request_id).entered();

        let result = self.run(raw);
        match &result {
            Ok(prediction) => info!(
                label = %prediction.label,
                probability = prediction.probability,
                rules = ?prediction.fired_rules(),
                "Prediction served"
            ),
            Err(e) => warn!(kind = e.kind().as_str(), error = %e, "Prediction failed"),
        }
        result
    }

    fn run(&self, raw: &RawInput) -> Result<PredictionResult, ChurnError> {
        let (features, derived) = self.extractor.extract(raw)?;
        let outcome = self.inference.infer(&features)?;
        let findings = self.explainer.explain(&derived, outcome.label);

        Ok(PredictionResult {
            label: outcome.label,
            probability: outcome.probability,
            findings,
        })
    }
}
