//! Token values.
//!
//! Token files are JSON, but the engine never works on `serde_json::Value`
//! directly: values are converted once into [`Value`], a tagged variant whose
//! maps are ordered (`BTreeMap`) so that every traversal is deterministic.
//!
//! # Serialisation
//!
//! [`Value::to_css_string`] renders a value the way it appears in CSS:
//!
//! | Value | Rendering |
//! |-------|-----------|
//! | `String("1rem")` | `1rem` |
//! | `Integer(4)` | `4` |
//! | `Float(1.0)` | `1` |
//! | `Float(0.5)` | `0.5` |
//! | `List(["Inter", "sans-serif"])` | `Inter, sans-serif` |
//!
//! Property-aware list separators live in [`crate::css::serialize`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// A token value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Converts a decoded JSON value.
    ///
    /// Unsigned integers above `i64::MAX` degrade to floats.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts back into a JSON value (used by the catalog).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// True for everything except lists and maps.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "array",
            Value::Map(_) => "object",
        }
    }

    /// Renders the value as CSS text, joining lists with `", "`.
    pub fn to_css_string(&self) -> String {
        self.join(", ")
    }

    /// Renders the value as CSS text, joining list elements with `separator`.
    pub fn join(&self, separator: &str) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_number(*f),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(|item| item.join(separator))
                .collect::<Vec<_>>()
                .join(separator),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v.join(separator)))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_string())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Formats a float without trailing zeros: `1.0` -> `1`, `0.5000` -> `0.5`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{}", value)
}

/// Rounds to four decimal places, removing binary float noise from arithmetic.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Conversion
    // =========================================================================

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from_json(&json!(4)), Value::Integer(4));
        assert_eq!(Value::from_json(&json!(0.5)), Value::Float(0.5));
        assert_eq!(Value::from_json(&json!(-3)), Value::Integer(-3));
    }

    #[test]
    fn test_from_json_nested() {
        let value = Value::from_json(&json!({"b": [1, "x"], "a": true}));
        let map = value.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            map["b"],
            Value::List(vec![Value::Integer(1), Value::String("x".into())])
        );
    }

    #[test]
    fn test_json_round_trip_preserves_integers() {
        let original = json!({"n": 4, "f": 1.5, "s": "a"});
        assert_eq!(Value::from_json(&original).to_json(), original);
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    #[test]
    fn test_format_number_minimal() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.5000), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-2.25), "-2.25");
    }

    #[test]
    fn test_round4_strips_noise() {
        assert_eq!(format_number(round4(0.1 + 0.2)), "0.3");
        assert_eq!(format_number(round4(0.25 * 3.0)), "0.75");
    }

    #[test]
    fn test_to_css_string() {
        assert_eq!(Value::from("1rem").to_css_string(), "1rem");
        assert_eq!(Value::Float(1.0).to_css_string(), "1");
        let list = Value::List(vec!["Inter".into(), "sans-serif".into()]);
        assert_eq!(list.to_css_string(), "Inter, sans-serif");
        assert_eq!(list.join(" "), "Inter sans-serif");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Integer(1).kind_name(), "integer");
        assert_eq!(Value::List(vec![]).kind_name(), "array");
        assert!(Value::Bool(true).is_scalar());
        assert!(!Value::List(vec![]).is_scalar());
    }
}
