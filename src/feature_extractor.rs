//! Feature extraction for churn model inference.
//!
//! This module parses the submitted form into a typed customer record and
//! derives the engineered features used during model training.

use crate::error::FeatureError;
use crate::types::customer::{CustomerRecord, RawInput};

/// Number of values in a model input row.
pub const FEATURE_COUNT: usize = 19;

/// Feature names in the exact order expected by the model.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Direct (14)
    "Account length",
    "Area code",
    "International plan",
    "Voice mail plan",
    "Number vmail messages",
    "Total day minutes",
    "Total day calls",
    "Total eve minutes",
    "Total eve calls",
    "Total night minutes",
    "Total night calls",
    "Total intl minutes",
    "Total intl calls",
    "Customer service calls",
    // Engineered (5)
    "total_minutes",
    "total_calls",
    "intl_plan_day_minutes",
    "cust_serv_intl",
    "total_calls_ratio",
];

/// Form field names, in feature order.
pub mod fields {
    pub const ACCOUNT_LENGTH: &str = "account_length";
    pub const AREA_CODE: &str = "area_code";
    pub const INTL_PLAN: &str = "intl_plan";
    pub const VMAIL_PLAN: &str = "vmail_plan";
    pub const VMAIL_MESSAGES: &str = "vmail_messages";
    pub const DAY_MINUTES: &str = "total_day_minutes";
    pub const DAY_CALLS: &str = "total_day_calls";
    pub const EVE_MINUTES: &str = "total_eve_minutes";
    pub const EVE_CALLS: &str = "total_eve_calls";
    pub const NIGHT_MINUTES: &str = "total_night_minutes";
    pub const NIGHT_CALLS: &str = "total_night_calls";
    pub const INTL_MINUTES: &str = "total_intl_minutes";
    pub const INTL_CALLS: &str = "total_intl_calls";
    pub const CUST_SERV_CALLS: &str = "cust_serv_calls";

    pub const ALL: [&str; 14] = [
        ACCOUNT_LENGTH,
        AREA_CODE,
        INTL_PLAN,
        VMAIL_PLAN,
        VMAIL_MESSAGES,
        DAY_MINUTES,
        DAY_CALLS,
        EVE_MINUTES,
        EVE_CALLS,
        NIGHT_MINUTES,
        NIGHT_CALLS,
        INTL_MINUTES,
        INTL_CALLS,
        CUST_SERV_CALLS,
    ];
}

/// Model input row. Reordering silently corrupts predictions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value of a feature by its training name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|idx| self.0[idx])
    }

    /// Single float32 row as consumed by the ONNX graphs
    pub fn to_model_row(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }
}

/// Features consulted by the explanation rules, selected by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    /// 0 or 1
    pub international_plan: i64,
    pub customer_service_calls: i64,
    pub intl_plan_day_minutes: f64,
    pub cust_serv_intl: i64,
    pub total_calls_ratio: f64,
}

/// Feature extractor that transforms form submissions into model input features.
///
/// Matches the preprocessing done in the training pipeline.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Parse, then derive. No vector is produced if any field is bad.
    pub fn extract(&self, raw: &RawInput) -> Result<(FeatureVector, DerivedFeatures), FeatureError> {
        let record = self.parse(raw)?;
        self.derive(&record)
    }

    /// Coerce every form field to its primitive type.
    pub fn parse(&self, raw: &RawInput) -> Result<CustomerRecord, FeatureError> {
        use self::fields::*;

        Ok(CustomerRecord {
            account_length: parse_int(raw, ACCOUNT_LENGTH)?,
            area_code: parse_int(raw, AREA_CODE)?,
            international_plan: parse_flag(raw, INTL_PLAN)?,
            voice_mail_plan: parse_flag(raw, VMAIL_PLAN)?,
            voice_mail_messages: parse_int(raw, VMAIL_MESSAGES)?,
            day_minutes: parse_float(raw, DAY_MINUTES)?,
            day_calls: parse_int(raw, DAY_CALLS)?,
            evening_minutes: parse_float(raw, EVE_MINUTES)?,
            evening_calls: parse_int(raw, EVE_CALLS)?,
            night_minutes: parse_float(raw, NIGHT_MINUTES)?,
            night_calls: parse_int(raw, NIGHT_CALLS)?,
            international_minutes: parse_float(raw, INTL_MINUTES)?,
            international_calls: parse_int(raw, INTL_CALLS)?,
            customer_service_calls: parse_int(raw, CUST_SERV_CALLS)?,
        })
    }

    /// Compute the engineered features and assemble the model row.
    pub fn derive(
        &self,
        record: &CustomerRecord,
    ) -> Result<(FeatureVector, DerivedFeatures), FeatureError> {
        let intl_plan = record.international_plan as i64;
        let vmail_plan = record.voice_mail_plan as i64;

        let total_minutes = record.day_minutes + record.evening_minutes + record.night_minutes;
        let total_calls = record
            .day_calls
            .saturating_add(record.evening_calls)
            .saturating_add(record.night_calls);
        let intl_plan_day_minutes = intl_plan as f64 * record.day_minutes;
        let cust_serv_intl = record.customer_service_calls * intl_plan;

        // +1 keeps brand-new accounts defined; only -1 can still hit zero
        let account_days = record.account_length as f64 + 1.0;
        if account_days == 0.0 {
            return Err(FeatureError::ZeroAccountAge(record.account_length));
        }
        let total_calls_ratio = total_calls as f64 / account_days;

        let vector = FeatureVector([
            record.account_length as f64,
            record.area_code as f64,
            intl_plan as f64,
            vmail_plan as f64,
            record.voice_mail_messages as f64,
            record.day_minutes,
            record.day_calls as f64,
            record.evening_minutes,
            record.evening_calls as f64,
            record.night_minutes,
            record.night_calls as f64,
            record.international_minutes,
            record.international_calls as f64,
            record.customer_service_calls as f64,
            total_minutes,
            total_calls as f64,
            intl_plan_day_minutes,
            cust_serv_intl as f64,
            total_calls_ratio,
        ]);

        let derived = DerivedFeatures {
            international_plan: intl_plan,
            customer_service_calls: record.customer_service_calls,
            intl_plan_day_minutes,
            cust_serv_intl,
            total_calls_ratio,
        };

        Ok((vector, derived))
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names (matching training order).
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(raw: &'a RawInput, name: &'static str) -> Result<&'a str, FeatureError> {
    raw.get(name).ok_or(FeatureError::MissingField(name))
}

fn parse_int(raw: &RawInput, name: &'static str) -> Result<i64, FeatureError> {
    let value = field(raw, name)?;
    value
        .trim()
        .parse()
        .map_err(|_| FeatureError::InvalidValue {
            field: name,
            expected: "integer",
            value: value.to_string(),
        })
}

fn parse_float(raw: &RawInput, name: &'static str) -> Result<f64, FeatureError> {
    let value = field(raw, name)?;
    value
        .trim()
        .parse()
        .map_err(|_| FeatureError::InvalidValue {
            field: name,
            expected: "number",
            value: value.to_string(),
        })
}

/// "yes" in any case is set; every other present value is unset
fn parse_flag(raw: &RawInput, name: &'static str) -> Result<bool, FeatureError> {
    Ok(field(raw, name)?.to_lowercase() == "yes")
}
