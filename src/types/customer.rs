//! Customer usage data as submitted by the prediction form

use std::collections::HashMap;

/// Raw form submission: field name to unparsed string value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    fields: HashMap<String, String>,
}

impl RawInput {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Build from `(name, value)` pairs; later duplicates win
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for RawInput {
    fn from(fields: HashMap<String, String>) -> Self {
        Self::new(fields)
    }
}

/// Typed customer record parsed from a [`RawInput`]
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    /// Account age in days
    pub account_length: i64,
    pub area_code: i64,
    pub international_plan: bool,
    pub voice_mail_plan: bool,
    pub voice_mail_messages: i64,
    pub day_minutes: f64,
    pub day_calls: i64,
    pub evening_minutes: f64,
    pub evening_calls: i64,
    pub night_minutes: f64,
    pub night_calls: i64,
    pub international_minutes: f64,
    pub international_calls: i64,
    pub customer_service_calls: i64,
}

impl CustomerRecord {
    /// Create a record with the given account age and all usage zeroed
    pub fn new(account_length: i64) -> Self {
        Self {
            account_length,
            area_code: 415,
            international_plan: false,
            voice_mail_plan: false,
            voice_mail_messages: 0,
            day_minutes: 0.0,
            day_calls: 0,
            evening_minutes: 0.0,
            evening_calls: 0,
            night_minutes: 0.0,
            night_calls: 0,
            international_minutes: 0.0,
            international_calls: 0,
            customer_service_calls: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_input_lookup() {
        let raw = RawInput::from_pairs([("account_length", "12"), ("intl_plan", "Yes")]);

        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get("intl_plan"), Some("Yes"));
        assert_eq!(raw.get("area_code"), None);
    }
}
