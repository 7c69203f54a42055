// crates/rule-expr/src/value.rs
// ============================================================================
// Module: Rule Expression Values
// Description: Runtime value model for expression evaluation.
// Purpose: Provide a closed, JSON-compatible value type with stable kinds.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Expression values mirror JSON with one simplification: all numbers are
//! `f64`. Conversions to and from [`serde_json::Value`] keep integral numbers
//! integral so round-tripping user data does not introduce `.0` suffixes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ============================================================================
// SECTION: Value Type
// ============================================================================

/// Value produced or consumed by expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    Array(Vec<ExprValue>),
    /// String-keyed map of values.
    Object(BTreeMap<String, ExprValue>),
}

impl ExprValue {
    /// Returns a stable label for the value kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns the boolean payload when the value is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload when the value is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Converts the value into JSON, keeping safe integers integral.
    ///
    /// Non-finite numbers have no JSON form and become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(value) => number_to_json(*value),
            Self::String(value) => Value::String(value.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => {
                Value::Object(map.iter().map(|(key, value)| (key.clone(), value.to_json())).collect())
            }
        }
    }
}

impl From<&Value> for ExprValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(text) => Self::String(text.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.iter().map(|(key, value)| (key.clone(), Self::from(value))).collect())
            }
        }
    }
}

impl From<Value> for ExprValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<bool> for ExprValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ExprValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ExprValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for ExprValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExprValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Self>> for ExprValue {
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{}", format_number(*value)),
            Self::String(value) => f.write_str(value),
            Self::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

// ============================================================================
// SECTION: Number Helpers
// ============================================================================

/// Formats a number without a trailing `.0` when it is a safe integer.
#[must_use]
pub fn format_number(value: f64) -> String {
    match safe_integer(value) {
        Some(integer) => integer.to_string(),
        None => value.to_string(),
    }
}

/// Returns the integral value when `value` is a safe integer.
#[must_use]
pub fn safe_integer(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > MAX_SAFE_INTEGER {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, reason = "Range checked against MAX_SAFE_INTEGER.")]
    let integer = value as i64;
    Some(integer)
}

/// Converts an `f64` into a JSON number, preferring an integral encoding.
fn number_to_json(value: f64) -> Value {
    if let Some(integer) = safe_integer(value) {
        return Value::Number(Number::from(integer));
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
