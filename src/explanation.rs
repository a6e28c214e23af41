//! Rule-based churn explanations

use crate::feature_extractor::DerivedFeatures;
use crate::types::prediction::{ChurnLabel, Finding};
use tracing::debug;

/// A single threshold rule: condition plus the text it contributes
struct Rule {
    name: &'static str,
    applies: fn(&DerivedFeatures) -> bool,
    reason: fn(&DerivedFeatures) -> String,
    recommendation: &'static str,
}

static RULES: [Rule; 5] = [
    Rule {
        name: "international_plan",
        applies: |f| f.international_plan == 1,
        reason: |_| "Customer has International Plan which increases churn risk.".to_string(),
        recommendation: "Offer discounts or revise International Plan charges.",
    },
    Rule {
        name: "service_calls",
        applies: |f| f.customer_service_calls > 3,
        reason: |f| {
            format!(
                "High customer service calls ({}) indicate dissatisfaction.",
                f.customer_service_calls
            )
        },
        recommendation: "Improve support quality and resolve issues quickly.",
    },
    Rule {
        name: "intl_day_minutes",
        applies: |f| f.intl_plan_day_minutes > 200.0,
        reason: |_| {
            "High day minutes with International Plan indicates high billing risk.".to_string()
        },
        recommendation: "Provide loyalty discounts for heavy day usage customers.",
    },
    Rule {
        name: "intl_service_calls",
        applies: |f| f.cust_serv_intl > 2,
        reason: |_| {
            "Frequent service calls with International Plan — potential dissatisfaction."
                .to_string()
        },
        recommendation: "Provide personalized assistance and incentives.",
    },
    Rule {
        name: "call_ratio",
        applies: |f| f.total_calls_ratio > 0.5,
        reason: |_| "High call ratio compared to account age indicates usage stress.".to_string(),
        recommendation: "Offer bundled packages to retain heavy callers.",
    },
];

/// Name of the finding emitted when no rule fires
pub const DEFAULT_RULE: &str = "default";
const DEFAULT_REASON: &str = "No major churn indicators detected.";
const DEFAULT_RECOMMENDATION: &str = "Maintain regular engagement with customer.";

/// Evaluates the rule table against derived features.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplanationEngine;

impl ExplanationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Names of all rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        RULES.iter().map(|r| r.name).collect()
    }

    /// Produce one finding per firing rule, in table order.
    ///
    /// Rules are independent. The label does not influence any of them.
    /// Always returns at least one finding.
    pub fn explain(&self, features: &DerivedFeatures, _label: ChurnLabel) -> Vec<Finding> {
        let mut findings: Vec<Finding> = RULES
            .iter()
            .filter(|rule| (rule.applies)(features))
            .map(|rule| Finding {
                rule: rule.name,
                reason: (rule.reason)(features),
                recommendation: rule.recommendation.to_string(),
            })
            .collect();

        if findings.is_empty() {
            findings.push(Finding {
                rule: DEFAULT_RULE,
                reason: DEFAULT_REASON.to_string(),
                recommendation: DEFAULT_RECOMMENDATION.to_string(),
            });
        }

        debug!(
            rules = ?findings.iter().map(|f| f.rule).collect::<Vec<_>>(),
            "Explanation rules evaluated"
        );

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> DerivedFeatures {
        DerivedFeatures {
            international_plan: 0,
            customer_service_calls: 1,
            intl_plan_day_minutes: 0.0,
            cust_serv_intl: 0,
            total_calls_ratio: 0.0,
        }
    }

    fn rules_fired(features: &DerivedFeatures) -> Vec<&'static str> {
        ExplanationEngine::new()
            .explain(features, ChurnLabel::NoChurn)
            .iter()
            .map(|f| f.rule)
            .collect()
    }

    #[test]
    fn test_default_pair_when_nothing_fires() {
        let findings = ExplanationEngine::new().explain(&quiet(), ChurnLabel::NoChurn);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, DEFAULT_RULE);
        assert_eq!(findings[0].reason, "No major churn indicators detected.");
        assert_eq!(
            findings[0].recommendation,
            "Maintain regular engagement with customer."
        );
    }

    #[test]
    fn test_service_call_threshold() {
        let mut features = quiet();
        features.customer_service_calls = 3;
        assert_eq!(rules_fired(&features), vec![DEFAULT_RULE]);

        features.customer_service_calls = 4;
        let findings = ExplanationEngine::new().explain(&features, ChurnLabel::NoChurn);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].reason,
            "High customer service calls (4) indicate dissatisfaction."
        );
        assert_eq!(
            findings[0].recommendation,
            "Improve support quality and resolve issues quickly."
        );
    }

    #[test]
    fn test_strict_thresholds() {
        let mut features = quiet();
        features.intl_plan_day_minutes = 200.0;
        features.cust_serv_intl = 2;
        features.total_calls_ratio = 0.5;
        assert_eq!(rules_fired(&features), vec![DEFAULT_RULE]);

        features.intl_plan_day_minutes = 200.01;
        features.cust_serv_intl = 3;
        features.total_calls_ratio = 0.51;
        assert_eq!(
            rules_fired(&features),
            vec!["intl_day_minutes", "intl_service_calls", "call_ratio"]
        );
    }

    #[test]
    fn test_heavy_international_customer() {
        let features = DerivedFeatures {
            international_plan: 1,
            customer_service_calls: 5,
            intl_plan_day_minutes: 250.0,
            cust_serv_intl: 5,
            total_calls_ratio: 0.0,
        };

        let findings = ExplanationEngine::new().explain(&features, ChurnLabel::Churn);

        assert_eq!(
            findings.iter().map(|f| f.rule).collect::<Vec<_>>(),
            vec![
                "international_plan",
                "service_calls",
                "intl_day_minutes",
                "intl_service_calls"
            ]
        );
        assert_eq!(
            findings[0].reason,
            "Customer has International Plan which increases churn risk."
        );
        assert_eq!(
            findings[3].reason,
            "Frequent service calls with International Plan — potential dissatisfaction."
        );
        assert_eq!(findings[3].recommendation, "Provide personalized assistance and incentives.");
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let features = DerivedFeatures {
            international_plan: 1,
            customer_service_calls: 9,
            intl_plan_day_minutes: 300.0,
            cust_serv_intl: 9,
            total_calls_ratio: 2.0,
        };

        assert_eq!(rules_fired(&features), ExplanationEngine::new().rule_names());
    }

    #[test]
    fn test_label_is_ignored() {
        let features = quiet();
        let engine = ExplanationEngine::new();

        assert_eq!(
            engine.explain(&features, ChurnLabel::Churn),
            engine.explain(&features, ChurnLabel::NoChurn)
        );
    }
}
