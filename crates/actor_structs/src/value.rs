//! Dynamically typed values carried by example inputs and dataset items.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from string keys to values.
///
/// Key order is the order in which the upstream produced them.
pub type Record = IndexMap<String, FieldValue>;

/// A single result record produced by a run.
pub type DatasetItem = Record;

/// Closed set of value shapes an actor input or output may carry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON `null` or a missing value
    #[default]
    Absent,
    Boolean(bool),
    Number(serde_json::Number),
    Text(String),
    Sequence(Vec<FieldValue>),
    Record(Record),
}

impl FieldValue {
    /// Returns the string slice when this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the nested record when this is a record value.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Absent,
            serde_json::Value::Bool(flag) => Self::Boolean(flag),
            serde_json::Value::Number(number) => Self::Number(number),
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(fields) => Self::Record(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_key_order() {
        let record: Record =
            serde_json::from_str(r#"{"zeta": 1, "alpha": "a", "mid": [true, null]}"#).unwrap();
        let keys: Vec<_> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(
            record["mid"],
            FieldValue::Sequence(vec![FieldValue::Boolean(true), FieldValue::Absent])
        );
    }

    #[test]
    fn test_nested_record() {
        let value: FieldValue =
            serde_json::from_str(r#"{"proxy": {"useApifyProxy": true}}"#).unwrap();
        let proxy = value.as_record().and_then(|record| record.get("proxy"));
        assert!(matches!(proxy, Some(FieldValue::Record(_))));
    }

    #[test]
    fn test_from_json_value() {
        let value = FieldValue::from(serde_json::json!({"limit": 5, "query": "foo"}));
        let record = value.as_record().unwrap();
        assert_eq!(record["limit"], FieldValue::from(5_i64));
        assert_eq!(record["query"].as_text(), Some("foo"));
    }
}
