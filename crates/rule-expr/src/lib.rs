// crates/rule-expr/src/lib.rs
// ============================================================================
// Module: Rule Expression Root
// Description: Public API surface for the rule expression language.
// Purpose: Wire together the parser, AST, evaluator, and value model.
// Dependencies: crate::{ast, error, eval, parser, value}
// ============================================================================

//! ## Overview
//! `rule-expr` is a small, sandboxed expression language for user-authored
//! validation rules such as `value > 0 && value < 100`. It parses into an AST
//! and evaluates against caller-supplied bindings; there is no access to the
//! host beyond the bound variables.
//!
//! ```
//! use rule_expr::Expression;
//! use rule_expr::ExprValue;
//! use rule_expr::SingleBinding;
//!
//! let rule = Expression::parse("value.length >= 1 && value.length <= 3").unwrap();
//! let ok = rule.evaluate_predicate(&SingleBinding::value(ExprValue::from("abc")));
//! assert_eq!(ok, Ok(true));
//! ```
//!
//! Security posture: expressions are untrusted input. Parsing enforces size
//! and nesting limits, with every operator and postfix chain link counted as a
//! level, so tree depth and evaluation recursion stay bounded. Evaluation
//! never panics and never allocates without bound beyond what the input
//! literals already describe.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use ast::BinaryOp;
pub use ast::Expr;
pub use ast::UnaryOp;
pub use error::ExprError;
pub use eval::Bindings;
pub use eval::NoBindings;
pub use eval::SingleBinding;
pub use eval::VALUE_BINDING;
pub use eval::evaluate;
pub use parser::DEFAULT_MAX_INPUT_BYTES;
pub use parser::DEFAULT_MAX_NESTING;
pub use parser::ParseLimits;
pub use parser::parse_expression;
pub use parser::parse_literal;
pub use parser::quote_str;
pub use value::ExprValue;

// ============================================================================
// SECTION: Compiled Expression
// ============================================================================

/// A parsed expression paired with its source text.
///
/// # Invariants
/// - `root` is the parse result of `source` under the limits it was parsed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Original source text.
    source: String,
    /// Parsed syntax tree.
    root: Expr,
}

impl Expression {
    /// Parses an expression with the default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError`] when the input is empty, too large, too deeply
    /// nested, or syntactically invalid.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        Self::parse_with_limits(source, ParseLimits::default())
    }

    /// Parses an expression with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError`] when parsing fails or a limit is exceeded.
    pub fn parse_with_limits(source: &str, limits: ParseLimits) -> Result<Self, ExprError> {
        let root = parse_expression(source, limits)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Returns the original source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluates the expression to a value.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError`] for unknown identifiers, type mismatches, and
    /// arithmetic faults.
    pub fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> Result<ExprValue, ExprError> {
        evaluate(&self.root, bindings)
    }

    /// Evaluates the expression and requires a boolean result.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::NotPredicate`] when the result is not a boolean,
    /// or any evaluation error.
    pub fn evaluate_predicate<B: Bindings + ?Sized>(&self, bindings: &B) -> Result<bool, ExprError> {
        match self.evaluate(bindings)? {
            ExprValue::Bool(result) => Ok(result),
            other => Err(ExprError::NotPredicate {
                found: other.kind(),
            }),
        }
    }
}
