//! Prediction outcome data structures

use crate::error::InferenceError;
use serde::Serialize;
use std::fmt;

/// Binary churn outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnLabel {
    NoChurn,
    Churn,
}

impl ChurnLabel {
    /// Map a model class id (0 or 1) to a label
    pub fn from_class(class: i64) -> Result<Self, InferenceError> {
        match class {
            0 => Ok(ChurnLabel::NoChurn),
            1 => Ok(ChurnLabel::Churn),
            other => Err(InferenceError::UnexpectedLabel(other)),
        }
    }

    pub fn class(&self) -> i64 {
        match self {
            ChurnLabel::NoChurn => 0,
            ChurnLabel::Churn => 1,
        }
    }

    pub fn is_churn(&self) -> bool {
        matches!(self, ChurnLabel::Churn)
    }
}

impl fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnLabel::NoChurn => f.write_str("No Churn"),
            ChurnLabel::Churn => f.write_str("Churn"),
        }
    }
}

/// One reason with its matching recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Name of the rule that produced this finding
    pub rule: &'static str,
    pub reason: String,
    pub recommendation: String,
}

/// Everything shown on the result page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: ChurnLabel,
    /// Churn probability as a percentage, two decimals
    pub probability: f64,
    pub findings: Vec<Finding>,
}

impl PredictionResult {
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.reason.as_str())
    }

    pub fn recommendations(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.recommendation.as_str())
    }

    pub fn fired_rules(&self) -> Vec<&'static str> {
        self.findings.iter().map(|f| f.rule).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(ChurnLabel::from_class(0).unwrap(), ChurnLabel::NoChurn);
        assert_eq!(ChurnLabel::from_class(1).unwrap(), ChurnLabel::Churn);
        assert!(matches!(
            ChurnLabel::from_class(2),
            Err(InferenceError::UnexpectedLabel(2))
        ));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(ChurnLabel::Churn.to_string(), "Churn");
        assert_eq!(ChurnLabel::NoChurn.to_string(), "No Churn");
    }

    #[test]
    fn test_result_sequences_are_aligned() {
        let result = PredictionResult {
            label: ChurnLabel::Churn,
            probability: 80.0,
            findings: vec![
                Finding {
                    rule: "a",
                    reason: "r1".to_string(),
                    recommendation: "x1".to_string(),
                },
                Finding {
                    rule: "b",
                    reason: "r2".to_string(),
                    recommendation: "x2".to_string(),
                },
            ],
        };

        assert_eq!(result.reasons().collect::<Vec<_>>(), vec!["r1", "r2"]);
        assert_eq!(result.recommendations().collect::<Vec<_>>(), vec!["x1", "x2"]);
        assert_eq!(result.fired_rules(), vec!["a", "b"]);
    }
}
