// crates/rule-expr/src/eval.rs
// ============================================================================
// Module: Rule Expression Evaluator
// Description: Strictly typed evaluation of parsed expressions.
// Purpose: Evaluate rule trees against caller-supplied bindings.
// Dependencies: crate::{ast, error, value}
// ============================================================================

//! ## Overview
//! Evaluation is strict: operators never coerce between kinds, so
//! `"5" > 3` is a type error rather than a silent conversion. `&&` and `||`
//! short-circuit and require boolean operands. Equality is structural and
//! accepts any pair of kinds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::ast::BinaryOp;
use crate::ast::Expr;
use crate::ast::UnaryOp;
use crate::error::ExprError;
use crate::value::ExprValue;
use crate::value::format_number;
use crate::value::safe_integer;

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Conventional name of the candidate value in validation rules.
pub const VALUE_BINDING: &str = "value";

/// Resolves variable names during evaluation.
pub trait Bindings {
    /// Returns the value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<ExprValue>;
}

impl<S: BuildHasher> Bindings for HashMap<String, ExprValue, S> {
    fn lookup(&self, name: &str) -> Option<ExprValue> {
        self.get(name).cloned()
    }
}

impl Bindings for BTreeMap<String, ExprValue> {
    fn lookup(&self, name: &str) -> Option<ExprValue> {
        self.get(name).cloned()
    }
}

impl<F> Bindings for F
where
    F: Fn(&str) -> Option<ExprValue>,
{
    fn lookup(&self, name: &str) -> Option<ExprValue> {
        self(name)
    }
}

/// Bindings with no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl Bindings for NoBindings {
    fn lookup(&self, _name: &str) -> Option<ExprValue> {
        None
    }
}

/// Bindings holding exactly one named value.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleBinding {
    /// Variable name.
    name: String,
    /// Bound value.
    value: ExprValue,
}

impl SingleBinding {
    /// Binds `value` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: ExprValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Binds `value` under [`VALUE_BINDING`].
    #[must_use]
    pub fn value(value: ExprValue) -> Self {
        Self::new(VALUE_BINDING, value)
    }
}

impl Bindings for SingleBinding {
    fn lookup(&self, name: &str) -> Option<ExprValue> {
        (name == self.name).then(|| self.value.clone())
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates an expression tree against the bindings.
///
/// # Errors
///
/// Returns [`ExprError`] for unknown identifiers, kind mismatches, arity
/// mismatches, out-of-range indexes, and arithmetic faults.
pub fn evaluate<B: Bindings + ?Sized>(expr: &Expr, bindings: &B) -> Result<ExprValue, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => bindings.lookup(name).ok_or_else(|| ExprError::UnknownIdentifier {
            name: name.clone(),
        }),
        Expr::Array(items) => evaluate_all(items, bindings).map(ExprValue::Array),
        Expr::Unary {
            op,
            operand,
        } => apply_unary(*op, evaluate(operand, bindings)?),
        Expr::Binary {
            op: op @ (BinaryOp::And | BinaryOp::Or),
            left,
            right,
        } => apply_logical(*op, left, right, bindings),
        Expr::Binary {
            op,
            left,
            right,
        } => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            apply_binary(*op, &left, &right)
        }
        Expr::Member {
            target,
            property,
        } => member(evaluate(target, bindings)?, property),
        Expr::Index {
            target,
            index,
        } => {
            let target = evaluate(target, bindings)?;
            let index = evaluate(index, bindings)?;
            index_into(target, &index)
        }
        Expr::Call {
            function,
            args,
        } => call_function(function, evaluate_all(args, bindings)?),
        Expr::MethodCall {
            target,
            method,
            args,
        } => {
            let receiver = evaluate(target, bindings)?;
            call_method(&receiver, method, evaluate_all(args, bindings)?)
        }
    }
}

/// Evaluates each expression in order.
fn evaluate_all<B: Bindings + ?Sized>(items: &[Expr], bindings: &B) -> Result<Vec<ExprValue>, ExprError> {
    items.iter().map(|item| evaluate(item, bindings)).collect()
}

/// Applies a unary operator.
fn apply_unary(op: UnaryOp, operand: ExprValue) -> Result<ExprValue, ExprError> {
    match (op, &operand) {
        (UnaryOp::Not, ExprValue::Bool(flag)) => Ok(ExprValue::Bool(!flag)),
        (UnaryOp::Negate, ExprValue::Number(number)) => Ok(ExprValue::Number(-number)),
        (UnaryOp::Plus, ExprValue::Number(_)) => Ok(operand),
        _ => Err(mismatch(op.symbol(), &[&operand])),
    }
}

/// Applies `&&` or `||` with short-circuiting.
fn apply_logical<B: Bindings + ?Sized>(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    bindings: &B,
) -> Result<ExprValue, ExprError> {
    let left = evaluate(left, bindings)?;
    let Some(left_flag) = left.as_bool() else {
        return Err(mismatch(op.symbol(), &[&left]));
    };
    match (op, left_flag) {
        (BinaryOp::And, false) => return Ok(ExprValue::Bool(false)),
        (BinaryOp::Or, true) => return Ok(ExprValue::Bool(true)),
        _ => {}
    }
    let right = evaluate(right, bindings)?;
    right.as_bool().map(ExprValue::Bool).ok_or_else(|| mismatch(op.symbol(), &[&left, &right]))
}

/// Applies a non-logical binary operator.
fn apply_binary(op: BinaryOp, left: &ExprValue, right: &ExprValue) -> Result<ExprValue, ExprError> {
    match op {
        BinaryOp::Eq => Ok(ExprValue::Bool(left == right)),
        BinaryOp::NotEq => Ok(ExprValue::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, left, right),
        BinaryOp::In => contains(op.symbol(), right, left),
        BinaryOp::Add => match (left, right) {
            (ExprValue::Number(a), ExprValue::Number(b)) => finite(op, a + b),
            (ExprValue::String(_), _) | (_, ExprValue::String(_)) => {
                Ok(ExprValue::String(format!("{left}{right}")))
            }
            _ => Err(mismatch(op.symbol(), &[left, right])),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (ExprValue::Number(a), ExprValue::Number(b)) = (left, right) else {
                return Err(mismatch(op.symbol(), &[left, right]));
            };
            if matches!(op, BinaryOp::Div | BinaryOp::Rem) && *b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            let result = match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            };
            finite(op, result)
        }
        BinaryOp::And | BinaryOp::Or => Err(mismatch(op.symbol(), &[left, right])),
    }
}

/// Compares two numbers or two strings.
fn compare(op: BinaryOp, left: &ExprValue, right: &ExprValue) -> Result<ExprValue, ExprError> {
    let ordering = match (left, right) {
        (ExprValue::Number(a), ExprValue::Number(b)) => a.partial_cmp(b),
        (ExprValue::String(a), ExprValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return Err(mismatch(op.symbol(), &[left, right]));
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(ExprValue::Bool(result))
}

/// Tests whether `haystack` contains `needle`.
fn contains(operation: &str, haystack: &ExprValue, needle: &ExprValue) -> Result<ExprValue, ExprError> {
    match (haystack, needle) {
        (ExprValue::Array(items), _) => Ok(ExprValue::Bool(items.contains(needle))),
        (ExprValue::String(text), ExprValue::String(part)) => {
            Ok(ExprValue::Bool(text.contains(part.as_str())))
        }
        (ExprValue::Object(map), ExprValue::String(key)) => Ok(ExprValue::Bool(map.contains_key(key))),
        _ => Err(mismatch(operation, &[needle, haystack])),
    }
}

/// Rejects non-finite arithmetic results.
fn finite(op: BinaryOp, result: f64) -> Result<ExprValue, ExprError> {
    if result.is_finite() {
        Ok(ExprValue::Number(result))
    } else {
        Err(ExprError::NonFiniteResult {
            operation: op.symbol(),
        })
    }
}

// ============================================================================
// SECTION: Member and Index Access
// ============================================================================

/// Resolves `target.property`.
fn member(target: ExprValue, property: &str) -> Result<ExprValue, ExprError> {
    match target {
        ExprValue::Object(mut map) => Ok(map.remove(property).unwrap_or(ExprValue::Null)),
        ExprValue::String(text) if property == "length" => Ok(length(text.chars().count())),
        ExprValue::Array(items) if property == "length" => Ok(length(items.len())),
        other => Err(ExprError::UnknownProperty {
            property: property.to_string(),
            receiver: other.kind(),
        }),
    }
}

/// Resolves `target[index]`.
fn index_into(target: ExprValue, index: &ExprValue) -> Result<ExprValue, ExprError> {
    match (target, index) {
        (ExprValue::Array(mut items), ExprValue::Number(number)) => {
            let position = to_index(*number, items.len())?;
            Ok(items.swap_remove(position))
        }
        (ExprValue::String(text), ExprValue::Number(number)) => {
            let count = text.chars().count();
            let position = to_index(*number, count)?;
            Ok(text.chars().nth(position).map_or(ExprValue::Null, |ch| ExprValue::String(ch.to_string())))
        }
        (ExprValue::Object(mut map), ExprValue::String(key)) => {
            Ok(map.remove(key).unwrap_or(ExprValue::Null))
        }
        (target, index) => Err(mismatch("[]", &[&target, index])),
    }
}

/// Converts a numeric index into a bounds-checked position.
fn to_index(number: f64, len: usize) -> Result<usize, ExprError> {
    safe_integer(number)
        .and_then(|integer| usize::try_from(integer).ok())
        .filter(|position| *position < len)
        .ok_or_else(|| ExprError::IndexOutOfBounds {
            index: format_number(number),
            len,
        })
}

/// Converts a length into a numeric value.
fn length(len: usize) -> ExprValue {
    ExprValue::Number(u32::try_from(len).map_or(f64::from(u32::MAX), f64::from))
}

// ============================================================================
// SECTION: Functions and Methods
// ============================================================================

/// Calls a free function.
fn call_function(function: &str, args: Vec<ExprValue>) -> Result<ExprValue, ExprError> {
    match function {
        "len" => {
            let [arg] = exactly::<1>(function, args)?;
            match &arg {
                ExprValue::String(text) => Ok(length(text.chars().count())),
                ExprValue::Array(items) => Ok(length(items.len())),
                ExprValue::Object(map) => Ok(length(map.len())),
                _ => Err(mismatch(function, &[&arg])),
            }
        }
        "abs" => {
            let [arg] = exactly::<1>(function, args)?;
            arg.as_number().map(|number| ExprValue::Number(number.abs())).ok_or_else(|| mismatch(function, &[&arg]))
        }
        "min" | "max" => extremum(function, args),
        _ => Err(ExprError::UnknownFunction {
            name: function.to_string(),
            position: 0,
        }),
    }
}

/// Computes `min` or `max` over numeric arguments or a single numeric array.
fn extremum(function: &str, args: Vec<ExprValue>) -> Result<ExprValue, ExprError> {
    let values = match <[ExprValue; 1]>::try_from(args) {
        Ok([ExprValue::Array(items)]) => items,
        Ok([single]) => vec![single],
        Err(args) => args,
    };
    if values.is_empty() {
        return Err(ExprError::ArityMismatch {
            function: function.to_string(),
            expected: "at least 1",
            found: 0,
        });
    }
    let mut best: Option<f64> = None;
    for value in &values {
        let Some(number) = value.as_number() else {
            return Err(mismatch(function, &[value]));
        };
        best = Some(match best {
            None => number,
            Some(current) if function == "min" => current.min(number),
            Some(current) => current.max(number),
        });
    }
    Ok(best.map_or(ExprValue::Null, ExprValue::Number))
}

/// Calls a method on a receiver.
fn call_method(receiver: &ExprValue, method: &str, args: Vec<ExprValue>) -> Result<ExprValue, ExprError> {
    match (method, receiver) {
        ("includes", ExprValue::Array(_) | ExprValue::String(_)) => {
            let [needle] = exactly::<1>(method, args)?;
            contains(method, receiver, &needle)
        }
        ("startsWith" | "endsWith", ExprValue::String(text)) => {
            let [arg] = exactly::<1>(method, args)?;
            let ExprValue::String(affix) = &arg else {
                return Err(mismatch(method, &[receiver, &arg]));
            };
            let result = if method == "startsWith" {
                text.starts_with(affix.as_str())
            } else {
                text.ends_with(affix.as_str())
            };
            Ok(ExprValue::Bool(result))
        }
        ("indexOf", ExprValue::String(text)) => {
            let [arg] = exactly::<1>(method, args)?;
            let ExprValue::String(part) = &arg else {
                return Err(mismatch(method, &[receiver, &arg]));
            };
            Ok(text.find(part.as_str()).map_or(ExprValue::Number(-1.0), |byte| length(text[.. byte].chars().count())))
        }
        ("indexOf", ExprValue::Array(items)) => {
            let [needle] = exactly::<1>(method, args)?;
            Ok(items.iter().position(|item| *item == needle).map_or(ExprValue::Number(-1.0), length))
        }
        ("toLowerCase", ExprValue::String(text)) => {
            exactly::<0>(method, args)?;
            Ok(ExprValue::String(text.to_lowercase()))
        }
        ("toUpperCase", ExprValue::String(text)) => {
            exactly::<0>(method, args)?;
            Ok(ExprValue::String(text.to_uppercase()))
        }
        ("trim", ExprValue::String(text)) => {
            exactly::<0>(method, args)?;
            Ok(ExprValue::String(text.trim().to_string()))
        }
        _ => Err(ExprError::UnsupportedMethod {
            method: method.to_string(),
            receiver: receiver.kind(),
        }),
    }
}

/// Requires exactly `N` arguments.
fn exactly<const N: usize>(function: &str, args: Vec<ExprValue>) -> Result<[ExprValue; N], ExprError> {
    <[ExprValue; N]>::try_from(args).map_err(|args| ExprError::ArityMismatch {
        function: function.to_string(),
        expected: arity_label(N),
        found: args.len(),
    })
}

/// Returns a static label for small arities.
const fn arity_label(count: usize) -> &'static str {
    match count {
        0 => "0",
        1 => "1",
        2 => "2",
        _ => "several",
    }
}

/// Builds a type mismatch error from operand values.
fn mismatch(operation: &str, operands: &[&ExprValue]) -> ExprError {
    ExprError::TypeMismatch {
        operation: operation.to_string(),
        operands: operands.iter().map(|value| value.kind()).collect(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
