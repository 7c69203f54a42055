// crates/formwork-core/src/runtime/validation.rs
// ============================================================================
// Module: Formwork Type and Validation Engine
// Description: Defaults, input coercion, numeric formats, and rule evaluation.
// Purpose: Decide whether a candidate value is acceptable for a property.
// Dependencies: crate::core, rule-expr, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Validation runs in a fixed order and stops at the first failure:
//! 1. numeric types must match their text grammar and be finite;
//! 2. with no rules declared the value is accepted;
//! 3. the candidate is bound to `value`: numeric types as numbers, boolean
//!    text as booleans, array items as strings, anything else as is;
//! 4. each rule is evaluated in order; the first `false` fails.
//!
//! A rule that cannot be parsed or evaluated is handled by
//! [`RuleErrorPolicy`]: fail-open records it in the [`ValidationReport`]
//! and moves on, fail-closed rejects the value. An unsupported rule kind is
//! always a failure.
//!
//! Rules are strictly typed. A `string` field binds a string, so a rule such
//! as `value > 0` on it is a type mismatch, not a comparison. Under fail-open
//! that mismatch is a suppressed fault and the value is accepted; numeric
//! checks belong on `integer`, `long`, or `double` fields.
//!
//! Every function here is pure. Callers decide where a failure message is
//! stored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;

use rule_expr::ExprError;
use rule_expr::ExprValue;
use rule_expr::Expression;
use rule_expr::ParseLimits;
use rule_expr::SingleBinding;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::core::PropertyDescriptor;
use crate::core::PropertyType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum digits after the sign for `integer` values.
const MAX_INTEGER_DIGITS: usize = 10;
/// Message for values failing the integer grammar.
const INTEGER_FORMAT_MESSAGE: &str = "value must be an integer";
/// Message for values failing the long grammar.
const LONG_FORMAT_MESSAGE: &str = "value must be a long integer";
/// Message for values failing the double grammar.
const DOUBLE_FORMAT_MESSAGE: &str = "value must be a number";

// ============================================================================
// SECTION: Options and Results
// ============================================================================

/// Handling of rules that fail to parse or evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleErrorPolicy {
    /// Treat the faulty rule as passing and report it.
    #[default]
    FailOpen,
    /// Treat the faulty rule as a validation failure.
    FailClosed,
}

/// Options controlling rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    /// Policy for faulty rules.
    pub rule_error_policy: RuleErrorPolicy,
    /// Parser limits applied to each rule expression.
    pub limits: ParseLimits,
}

/// Reasons a candidate value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value does not match the numeric grammar of its declared type.
    #[error("{message}")]
    TypeFormat {
        /// Declared type.
        expected: PropertyType,
        /// Fixed, type-specific message.
        message: &'static str,
    },
    /// A rule evaluated to false.
    #[error("{message}")]
    RuleFailed {
        /// Rule expression.
        expression: String,
        /// Rule message, or a generated one when the rule has none.
        message: String,
    },
    /// A rule uses a language this engine does not evaluate.
    #[error("unsupported validation rule kind `{rule_kind}`")]
    UnsupportedRuleKind {
        /// Declared rule kind.
        rule_kind: String,
    },
    /// A rule could not be evaluated under the fail-closed policy.
    #[error("validation rule `{expression}` could not be evaluated: {source}")]
    RuleEvaluation {
        /// Rule expression.
        expression: String,
        /// Parse or evaluation error.
        source: ExprError,
    },
}

/// Rule fault tolerated under the fail-open policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFault {
    /// Rule expression.
    pub expression: String,
    /// Parse or evaluation error.
    pub error: ExprError,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Rule faults suppressed by the fail-open policy.
    pub suppressed: Vec<RuleFault>,
}

impl ValidationReport {
    /// Returns true when no rule faults were suppressed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.suppressed.is_empty()
    }
}

// ============================================================================
// SECTION: Type Queries and Defaults
// ============================================================================

/// Case-insensitive membership test of the descriptor type against `types`.
///
/// Returns false for a missing descriptor.
#[must_use]
pub fn is_of_type(descriptor: Option<&PropertyDescriptor>, types: &[&str]) -> bool {
    descriptor.is_some_and(|descriptor| {
        types.iter().any(|candidate| descriptor.property_type.as_str().eq_ignore_ascii_case(candidate.trim()))
    })
}

/// Derives the initial value of a property that is absent from an instance.
///
/// - unset (or `null`) default: empty string;
/// - `enum`: the option matching the default case-insensitively, else the
///   first option, else empty string;
/// - `array`: the default literal with its enclosing bracket pair removed;
/// - `boolean`: true exactly when the default reads `true`;
/// - anything else: the default unchanged.
#[must_use]
pub fn default_value_for(descriptor: &PropertyDescriptor) -> Value {
    let Some(default) = descriptor.default_value.as_ref().filter(|value| !value.is_null()) else {
        return Value::String(String::new());
    };
    match descriptor.property_type {
        PropertyType::Enum => {
            let wanted = value_text(default).to_lowercase();
            descriptor
                .options
                .iter()
                .find(|option| option.to_lowercase() == wanted)
                .or_else(|| descriptor.options.first())
                .map_or_else(|| Value::String(String::new()), |option| Value::String(option.clone()))
        }
        PropertyType::Array => {
            let text = value_text(default);
            let mut chars = text.chars();
            chars.next();
            chars.next_back();
            Value::String(chars.as_str().to_string())
        }
        PropertyType::Boolean => Value::Bool(value_text(default) == "true"),
        _ => default.clone(),
    }
}

/// Returns the natural text of a JSON value; strings are not quoted.
fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

// ============================================================================
// SECTION: Numeric Grammars
// ============================================================================

/// Removes one leading `+` or `-`.
fn strip_sign(text: &str) -> &str {
    text.strip_prefix(['+', '-']).unwrap_or(text)
}

/// Matches `0` or a nonzero digit followed by digits, optionally length-capped.
fn is_canonical_digits(digits: &str, max_len: Option<usize>) -> bool {
    if digits == "0" {
        return true;
    }
    let bytes = digits.as_bytes();
    matches!(bytes.first(), Some(b'1' ..= b'9'))
        && bytes.iter().all(u8::is_ascii_digit)
        && max_len.is_none_or(|max| bytes.len() <= max)
}

/// Returns true when every byte is an ASCII digit and there is at least one.
fn is_digit_run(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Optional sign, then `0` or a nonzero digit followed by up to nine digits.
#[must_use]
pub fn is_integer_text(text: &str) -> bool {
    is_canonical_digits(strip_sign(text), Some(MAX_INTEGER_DIGITS))
}

/// Optional sign, then `0` or a nonzero digit followed by any digits.
#[must_use]
pub fn is_long_text(text: &str) -> bool {
    is_canonical_digits(strip_sign(text), None)
}

/// Optional sign, optional long-shaped integer part, optional `.digits`,
/// optional exponent; at least one digit before the exponent.
#[must_use]
pub fn is_double_text(text: &str) -> bool {
    let body = strip_sign(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(index) => (&body[.. index], Some(&body[index + 1 ..])),
        None => (body, None),
    };
    if exponent.is_some_and(|exponent| !is_digit_run(strip_sign(exponent))) {
        return false;
    }
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    if !whole.is_empty() && !is_canonical_digits(whole, None) {
        return false;
    }
    match fraction {
        Some(fraction) => is_digit_run(fraction),
        None => !whole.is_empty(),
    }
}

/// Returns the text checked by the numeric grammars.
fn numeric_text(candidate: &Value) -> Option<Cow<'_, str>> {
    match candidate {
        Value::String(text) => Some(Cow::Borrowed(text)),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        _ => None,
    }
}

/// Applies the numeric grammar of `property_type`; the number must also be
/// finite as an `f64`.
fn check_numeric_format(property_type: PropertyType, candidate: &Value) -> Result<(), ValidationError> {
    let matcher: fn(&str) -> bool = match property_type {
        PropertyType::Integer => is_integer_text,
        PropertyType::Long => is_long_text,
        PropertyType::Double => is_double_text,
        _ => return Ok(()),
    };
    let matches = numeric_text(candidate)
        .is_some_and(|text| matcher(&text) && text.parse::<f64>().is_ok_and(f64::is_finite));
    if matches {
        Ok(())
    } else {
        Err(ValidationError::TypeFormat {
            expected: property_type,
            message: numeric_format_message(property_type),
        })
    }
}

/// Returns the fixed format message of a numeric type.
const fn numeric_format_message(property_type: PropertyType) -> &'static str {
    match property_type {
        PropertyType::Integer => INTEGER_FORMAT_MESSAGE,
        PropertyType::Long => LONG_FORMAT_MESSAGE,
        _ => DOUBLE_FORMAT_MESSAGE,
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a candidate value against a property.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first failed check.
pub fn validate(
    descriptor: &PropertyDescriptor,
    candidate: &Value,
    options: &ValidationOptions,
) -> Result<(), ValidationError> {
    validate_with_report(descriptor, candidate, options).map(|_| ())
}

/// Validates a candidate value and reports rule faults tolerated by the
/// fail-open policy.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first failed check.
pub fn validate_with_report(
    descriptor: &PropertyDescriptor,
    candidate: &Value,
    options: &ValidationOptions,
) -> Result<ValidationReport, ValidationError> {
    let property_type = descriptor.property_type;
    check_numeric_format(property_type, candidate)?;

    let mut report = ValidationReport::default();
    if descriptor.validations.is_empty() {
        return Ok(report);
    }

    let bound = bind_candidate(property_type, candidate)?;
    for rule in &descriptor.validations {
        if !rule.is_expression_kind() {
            return Err(ValidationError::UnsupportedRuleKind {
                rule_kind: rule.rule_kind.clone(),
            });
        }
        let outcome = Expression::parse_with_limits(&rule.expression, options.limits)
            .and_then(|expression| expression.evaluate_predicate(&SingleBinding::value(bound.clone())));
        match outcome {
            Ok(true) => {}
            Ok(false) => {
                let message = if rule.message.trim().is_empty() {
                    format!("value does not satisfy `{}`", rule.expression)
                } else {
                    rule.message.clone()
                };
                return Err(ValidationError::RuleFailed {
                    expression: rule.expression.clone(),
                    message,
                });
            }
            Err(error) => match options.rule_error_policy {
                RuleErrorPolicy::FailOpen => report.suppressed.push(RuleFault {
                    expression: rule.expression.clone(),
                    error,
                }),
                RuleErrorPolicy::FailClosed => {
                    return Err(ValidationError::RuleEvaluation {
                        expression: rule.expression.clone(),
                        source: error,
                    });
                }
            },
        }
    }
    Ok(report)
}

/// Converts the candidate into the value bound to `value`.
///
/// Numeric types bind the number their text denotes, boolean text binds a
/// boolean, and array items bind as strings. Everything else binds as its
/// JSON value.
///
/// # Errors
///
/// Returns [`ValidationError::TypeFormat`] when numeric text that matched
/// its grammar is out of the finite `f64` range.
fn bind_candidate(property_type: PropertyType, candidate: &Value) -> Result<ExprValue, ValidationError> {
    if property_type.is_numeric()
        && let Some(text) = numeric_text(candidate)
    {
        return match text.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(ExprValue::Number(number)),
            _ => Err(ValidationError::TypeFormat {
                expected: property_type,
                message: numeric_format_message(property_type),
            }),
        };
    }
    let bound = match candidate {
        Value::String(text)
            if property_type == PropertyType::Boolean && (text == "true" || text == "false") =>
        {
            ExprValue::Bool(text == "true")
        }
        Value::Array(items) => {
            ExprValue::Array(items.iter().map(|item| ExprValue::from(value_text(item).into_owned())).collect())
        }
        other => ExprValue::from(other),
    };
    Ok(bound)
}

// ============================================================================
// SECTION: Input Coercion
// ============================================================================

/// Converts form text into a typed value for the property.
///
/// Numeric text that passes its grammar becomes a number, `true`/`false`
/// become booleans for boolean fields, comma-separated text becomes a list of
/// strings for array fields, and enum text is canonicalized to the matching
/// option. Anything else stays text so validation can report it.
#[must_use]
pub fn coerce_input(descriptor: &PropertyDescriptor, text: &str) -> Value {
    let trimmed = text.trim();
    match descriptor.property_type {
        PropertyType::Integer | PropertyType::Long => {
            let matches =
                if descriptor.property_type == PropertyType::Integer { is_integer_text(trimmed) } else { is_long_text(trimmed) };
            match trimmed.parse::<i64>() {
                Ok(number) if matches => Value::from(number),
                _ => Value::String(text.to_string()),
            }
        }
        PropertyType::Double if is_double_text(trimmed) => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::String(text.to_string()), Value::Number),
        PropertyType::Boolean if trimmed.eq_ignore_ascii_case("true") => Value::Bool(true),
        PropertyType::Boolean if trimmed.eq_ignore_ascii_case("false") => Value::Bool(false),
        PropertyType::Array => Value::Array(split_list(trimmed)),
        PropertyType::Enum => {
            let wanted = trimmed.to_lowercase();
            descriptor.options.iter().find(|option| option.to_lowercase() == wanted).map_or_else(
                || Value::String(text.to_string()),
                |option| Value::String(option.clone()),
            )
        }
        _ => Value::String(text.to_string()),
    }
}

/// Splits `a, "b", 'c'` (optionally bracketed) into trimmed, unquoted strings.
fn split_list(text: &str) -> Vec<Value> {
    let inner = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')).unwrap_or(text);
    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            let unquoted = ['"', '\'']
                .into_iter()
                .find_map(|quote| item.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)))
                .unwrap_or(item);
            unquoted.to_string()
        })
        .filter(|item| !item.is_empty())
        .map(Value::String)
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_grammar_caps_digits() {
        assert!(is_integer_text("-1234567890"));
        assert!(!is_integer_text("12345678901"));
        assert!(!is_integer_text("007"));
        assert!(!is_integer_text(""));
        assert!(is_long_text("12345678901234567890"));
    }

    #[test]
    fn double_grammar_requires_a_digit() {
        for accepted in ["0", "-3.5", ".5", "+1e10", "2.5E-3", "10"] {
            assert!(is_double_text(accepted), "{accepted}");
        }
        for rejected in ["", "-", ".", "1.", "e5", "1e", "01.5", "1.5.2", "abc"] {
            assert!(!is_double_text(rejected), "{rejected}");
        }
    }

    #[test]
    fn arrays_bind_as_string_lists() -> Result<(), ValidationError> {
        let bound = bind_candidate(PropertyType::Array, &serde_json::json!(["a", 1]))?;
        assert_eq!(bound, ExprValue::Array(vec![ExprValue::from("a"), ExprValue::from("1")]));
        assert_eq!(bind_candidate(PropertyType::Array, &serde_json::json!([]))?, ExprValue::Array(Vec::new()));
        Ok(())
    }

    #[test]
    fn numeric_text_binds_as_number() -> Result<(), ValidationError> {
        assert_eq!(bind_candidate(PropertyType::Long, &Value::from("+5"))?, ExprValue::Number(5.0));
        assert_eq!(bind_candidate(PropertyType::Double, &Value::from(".5"))?, ExprValue::Number(0.5));
        assert!(matches!(
            bind_candidate(PropertyType::Double, &Value::from("1e400")),
            Err(ValidationError::TypeFormat { expected: PropertyType::Double, .. })
        ));
        Ok(())
    }

    #[test]
    fn split_list_trims_quotes_and_brackets() {
        let items = split_list("[\"a\", 'b' , c,,]");
        assert_eq!(items, vec![Value::from("a"), Value::from("b"), Value::from("c")]);
    }
}
