//! Raw attribute maps as supplied by callers.
//!
//! Values are JSON: numbers, booleans (read as 0/1) or categorical strings.
//! A string is never read as a number, even when it looks like one.

use serde_json::{Map, Value};

/// Caller-supplied field name to value map. Ephemeral, never persisted.
pub type RawAttributes = Map<String, Value>;

/// Numeric reading of a value: numbers as-is, booleans as 0/1.
#[inline]
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Categorical reading of a value. Only strings qualify.
#[inline]
pub fn categorical_value(value: &Value) -> Option<&str> {
    value.as_str()
}

/// Numeric field lookup with a fallback for absent or non-numeric values.
pub fn numeric_or(raw: &RawAttributes, field: &str, default: f64) -> f64 {
    raw.get(field).and_then(numeric_value).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(&json!(3)), Some(3.0));
        assert_eq!(numeric_value(&json!(0.85)), Some(0.85));
        assert_eq!(numeric_value(&json!(true)), Some(1.0));
        assert_eq!(numeric_value(&json!(false)), Some(0.0));
        assert_eq!(numeric_value(&json!("3")), None);
        assert_eq!(numeric_value(&json!("true")), None);
        assert_eq!(numeric_value(&Value::Null), None);
    }

    #[test]
    fn test_numeric_or_fallback() {
        let raw = json!({"people_involved": 4, "injuries_reported": "two"});
        let raw = raw.as_object().unwrap();
        assert_eq!(numeric_or(raw, "people_involved", 1.0), 4.0);
        assert_eq!(numeric_or(raw, "injuries_reported", 0.0), 0.0);
        assert_eq!(numeric_or(raw, "near_sensitive_location", 0.0), 0.0);
    }
}
