//! Inference adapter over the injected churn classifier

use crate::error::InferenceError;
use crate::feature_extractor::FeatureVector;
use crate::models::classifier::Classifier;
use crate::types::prediction::ChurnLabel;
use std::sync::Arc;
use tracing::debug;

/// Result of model inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutcome {
    /// Ensemble prediction
    pub label: ChurnLabel,
    /// Churn probability of the queried estimator, as a percentage with two decimals
    pub probability: f64,
}

/// Queries the classifier for both the label and the probability.
///
/// The probability comes from one ensemble member, not the ensemble
/// aggregate, so it may disagree with the label.
#[derive(Clone)]
pub struct InferenceEngine {
    classifier: Arc<dyn Classifier>,
}

impl InferenceEngine {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Run inference on a single feature vector
    pub fn infer(&self, features: &FeatureVector) -> Result<ModelOutcome, InferenceError> {
        let label = self.classifier.predict(features)?;
        let probs = self.classifier.predict_proba(features)?;
        let probability = to_percentage(probs.churn);

        debug!(
            label = %label,
            churn_probability = probs.churn,
            probability = probability,
            "Inference complete"
        );

        Ok(ModelOutcome { label, probability })
    }
}

/// Scale to 0-100 and round to two decimals
pub fn to_percentage(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureExtractor;
    use crate::models::classifier::{ClassProbabilities, MockClassifier};
    use crate::types::customer::CustomerRecord;

    fn features() -> FeatureVector {
        FeatureExtractor::new()
            .derive(&CustomerRecord::new(10))
            .unwrap()
            .0
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(to_percentage(0.0), 0.0);
        assert_eq!(to_percentage(1.0), 100.0);
        assert_eq!(to_percentage(0.3), 30.0);
        assert_eq!(to_percentage(0.123456), 12.35);
        assert_eq!(to_percentage(2.0 / 3.0), 66.67);
    }

    #[test]
    fn test_label_and_member_probability() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .times(1)
            .returning(|_| Ok(ChurnLabel::Churn));
        // Member estimate disagrees with the ensemble label; both are reported as-is
        classifier
            .expect_predict_proba()
            .times(1)
            .returning(|_| Ok(ClassProbabilities::from_churn(0.4)));

        let engine = InferenceEngine::new(Arc::new(classifier));
        let outcome = engine.infer(&features()).unwrap();

        assert_eq!(outcome.label, ChurnLabel::Churn);
        assert_eq!(outcome.probability, 40.0);
    }

    #[test]
    fn test_predict_failure_is_fatal() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .returning(|_| Err(InferenceError::UnexpectedLabel(3)));
        classifier.expect_predict_proba().never();

        let engine = InferenceEngine::new(Arc::new(classifier));
        let err = engine.infer(&features()).unwrap_err();

        assert!(matches!(err, InferenceError::UnexpectedLabel(3)));
    }

    #[test]
    fn test_probability_failure_is_fatal() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .returning(|_| Ok(ChurnLabel::NoChurn));
        classifier.expect_predict_proba().returning(|_| {
            Err(InferenceError::MissingOutput {
                model: "estimator_0".to_string(),
                output: "probability",
            })
        });

        let engine = InferenceEngine::new(Arc::new(classifier));
        assert!(matches!(
            engine.infer(&features()),
            Err(InferenceError::MissingOutput { .. })
        ));
    }
}
