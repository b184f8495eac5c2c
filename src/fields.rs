//! Raw JSON field storage with typed projections.
//!
//! Sakai's entity broker returns loosely typed objects: numbers sometimes
//! arrive as strings, and timestamps are wrapped in `{"time": <millis>}`.
//! [`Fields`] keeps the object as received and offers lenient typed reads;
//! each entity exposes named accessors on top of it.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SakaiError};

/// A JSON object as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The raw value of `key`.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// A number, accepting numeric strings such as `"100"`.
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(number_f64)
    }

    /// An integer, accepting numeric strings such as `"202401"`.
    pub fn i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(number_i64)
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// A timestamp stored as `{"time": <millis>}` or as bare milliseconds.
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Local>> {
        let millis = match self.0.get(key)? {
            Value::Object(obj) => obj.get("time").and_then(Value::as_i64)?,
            other => other.as_i64()?,
        };
        to_local_time(millis)
    }

    /// Required string field, used for identity keys.
    pub(crate) fn require_str(&self, key: &str, entity_type: &str) -> Result<&str> {
        self.str(key).ok_or_else(|| {
            SakaiError::unexpected_shape(format!("{entity_type} is missing string field '{key}'"))
        })
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Fields {
    type Error = SakaiError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SakaiError::unexpected_shape(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Convert an API millisecond timestamp to local time.
///
/// The instant is `millis / 1000` seconds after the Unix epoch, rendered in
/// the process's local timezone.
pub fn to_local_time(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

fn number_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        Fields::try_from(value).unwrap()
    }

    #[test]
    fn test_timestamp_conversion_is_exact() {
        let converted = to_local_time(1_700_000_000_000).unwrap();
        let expected = Local.timestamp_opt(1_700_000_000, 0).single().unwrap();
        assert_eq!(converted, expected);
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_timestamp_keeps_millisecond_fraction() {
        let converted = to_local_time(1_700_000_000_250).unwrap();
        assert_eq!(converted.timestamp_millis(), 1_700_000_000_250);
    }

    #[test]
    fn test_timestamp_object_and_bare_forms() {
        let f = fields(json!({
            "dueTime": {"time": 1_700_000_000_000_i64, "display": "Nov 14"},
            "lastLoginTime": 1_700_000_000_000_i64,
            "bogus": {"when": 1},
        }));
        assert_eq!(f.timestamp("dueTime"), f.timestamp("lastLoginTime"));
        assert!(f.timestamp("bogus").is_none());
        assert!(f.timestamp("missing").is_none());
    }

    #[test]
    fn test_numeric_strings() {
        let f = fields(json!({"points": "100", "max": 12.5, "term": "202401", "bad": "n/a"}));
        assert_eq!(f.f64("points"), Some(100.0));
        assert_eq!(f.f64("max"), Some(12.5));
        assert_eq!(f.i64("term"), Some(202401));
        assert_eq!(f.f64("bad"), None);
    }

    #[test]
    fn test_typed_reads_do_not_coerce_other_types() {
        let f = fields(json!({"title": "HW1", "draft": false}));
        assert_eq!(f.str("title"), Some("HW1"));
        assert_eq!(f.bool("draft"), Some(false));
        assert_eq!(f.str("draft"), None);
        assert_eq!(f.bool("title"), None);
    }

    #[test]
    fn test_try_from_rejects_non_object() {
        let err = Fields::try_from(json!([1, 2])).unwrap_err();
        assert!(err.is_protocol());
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_require_str() {
        let f = fields(json!({"id": "s1"}));
        assert_eq!(f.require_str("id", "site").unwrap(), "s1");
        assert!(f.require_str("userId", "member").unwrap_err().is_protocol());
    }
}
