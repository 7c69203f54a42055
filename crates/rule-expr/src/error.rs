// crates/rule-expr/src/error.rs
// ============================================================================
// Module: Rule Expression Errors
// Description: Structured parse and evaluation diagnostics.
// Purpose: Give callers positions for syntax errors and kinds for type errors.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! A single error enum covers both phases. [`ExprError::is_syntax`] tells
//! callers whether the expression itself is malformed or whether it failed
//! against a particular value.

use std::fmt;

/// Errors raised while parsing or evaluating an expression.
///
/// # Invariants
/// - Positions are byte offsets into the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Input was empty or contained only whitespace.
    EmptyInput,
    /// Input exceeded the configured size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Input exceeded the configured nesting depth.
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Depth reached when the error occurred.
        actual_depth: usize,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected token encountered during parsing.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// String literal was not closed before end of input.
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// Unsupported escape sequence inside a string literal.
    InvalidEscape {
        /// The escaped character.
        escape: char,
        /// Byte offset of the backslash.
        position: usize,
    },
    /// Numeric literal failed to parse.
    InvalidNumber {
        /// The raw numeric text.
        raw: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected trailing input after a complete expression.
    TrailingInput {
        /// Byte offset where unexpected input begins.
        position: usize,
    },
    /// Function or method name is not part of the language.
    UnknownFunction {
        /// The unknown name.
        name: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Input was expected to be a literal but contained operators or names.
    NotLiteral,
    /// Identifier has no binding.
    UnknownIdentifier {
        /// The unresolved identifier.
        name: String,
    },
    /// Property does not exist on the receiver kind.
    UnknownProperty {
        /// Property name.
        property: String,
        /// Receiver kind.
        receiver: &'static str,
    },
    /// Method is not defined for the receiver kind.
    UnsupportedMethod {
        /// Method name.
        method: String,
        /// Receiver kind.
        receiver: &'static str,
    },
    /// Operand kinds are not valid for the operation.
    TypeMismatch {
        /// Operation label (operator symbol or function name).
        operation: String,
        /// Kinds of the operands, in order.
        operands: Vec<&'static str>,
    },
    /// Function or method received the wrong number of arguments.
    ArityMismatch {
        /// Function or method name.
        function: String,
        /// Human-friendly expected arity.
        expected: &'static str,
        /// Actual argument count.
        found: usize,
    },
    /// Index was out of range or not a non-negative integer.
    IndexOutOfBounds {
        /// Rendered index value.
        index: String,
        /// Length of the receiver.
        len: usize,
    },
    /// Division or remainder by zero.
    DivisionByZero,
    /// Arithmetic produced an infinite or NaN result.
    NonFiniteResult {
        /// Operation label.
        operation: &'static str,
    },
    /// Predicate expression evaluated to a non-boolean value.
    NotPredicate {
        /// Kind of the produced value.
        found: &'static str,
    },
}

impl ExprError {
    /// Returns true when the error describes malformed input rather than an
    /// evaluation failure.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::InputTooLarge { .. }
                | Self::NestingTooDeep { .. }
                | Self::UnexpectedToken { .. }
                | Self::UnterminatedString { .. }
                | Self::InvalidEscape { .. }
                | Self::InvalidNumber { .. }
                | Self::TrailingInput { .. }
                | Self::UnknownFunction { .. }
                | Self::NotLiteral
        )
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "expression is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => write!(f, "expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})"),
            Self::NestingTooDeep {
                max_depth,
                actual_depth,
                position,
            } => write!(
                f,
                "expression nesting exceeds limit: depth {actual_depth} (max {max_depth}) at \
                 {position}"
            ),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => write!(f, "unexpected token `{found}` at {position}, expected {expected}"),
            Self::UnterminatedString {
                position,
            } => write!(f, "unterminated string starting at {position}"),
            Self::InvalidEscape {
                escape,
                position,
            } => write!(f, "invalid escape `\\{escape}` at {position}"),
            Self::InvalidNumber {
                raw,
                position,
            } => write!(f, "invalid number `{raw}` at {position}"),
            Self::TrailingInput {
                position,
            } => write!(f, "unexpected trailing input at {position}"),
            Self::UnknownFunction {
                name,
                position,
            } => write!(f, "unknown function `{name}` at {position}"),
            Self::NotLiteral => write!(f, "expected a literal value"),
            Self::UnknownIdentifier {
                name,
            } => write!(f, "unknown identifier `{name}`"),
            Self::UnknownProperty {
                property,
                receiver,
            } => write!(f, "{receiver} has no property `{property}`"),
            Self::UnsupportedMethod {
                method,
                receiver,
            } => write!(f, "method `{method}` is not defined for {receiver}"),
            Self::TypeMismatch {
                operation,
                operands,
            } => write!(f, "`{operation}` cannot be applied to {}", operands.join(" and ")),
            Self::ArityMismatch {
                function,
                expected,
                found,
            } => write!(f, "`{function}` expects {expected} argument(s), got {found}"),
            Self::IndexOutOfBounds {
                index,
                len,
            } => write!(f, "index {index} is out of bounds for length {len}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::NonFiniteResult {
                operation,
            } => write!(f, "`{operation}` produced a non-finite number"),
            Self::NotPredicate {
                found,
            } => write!(f, "expression must evaluate to a boolean, got {found}"),
        }
    }
}

impl std::error::Error for ExprError {}
