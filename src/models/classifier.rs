//! Classifier capability consumed by the inference engine

use crate::error::InferenceError;
use crate::feature_extractor::FeatureVector;
use crate::types::prediction::ChurnLabel;

/// Class probabilities for a single row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub no_churn: f64,
    pub churn: f64,
}

impl ClassProbabilities {
    /// Build from the churn-class probability alone
    pub fn from_churn(churn: f64) -> Self {
        Self {
            no_churn: 1.0 - churn,
            churn,
        }
    }

    /// Class with the larger probability; ties go to no-churn
    pub fn most_likely(&self) -> ChurnLabel {
        if self.churn > self.no_churn {
            ChurnLabel::Churn
        } else {
            ChurnLabel::NoChurn
        }
    }
}

/// Pre-trained churn classifier.
///
/// `predict` answers for the whole ensemble, while `predict_proba` answers
/// for one constituent estimator only.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<ChurnLabel, InferenceError>;

    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities, InferenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_churn() {
        let probs = ClassProbabilities::from_churn(0.25);
        assert_eq!(probs.no_churn, 0.75);
        assert_eq!(probs.most_likely(), ChurnLabel::NoChurn);
        assert_eq!(ClassProbabilities::from_churn(0.9).most_likely(), ChurnLabel::Churn);
    }
}
