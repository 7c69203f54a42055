// crates/rule-expr/src/ast.rs
// ============================================================================
// Module: Rule Expression Syntax Tree
// Description: AST nodes produced by the parser.
// Purpose: Represent parsed rule expressions independent of evaluation.
// Dependencies: crate::value
// ============================================================================

//! ## Overview
//! The syntax tree is deliberately small: literals, variables, array
//! literals, unary and binary operators, member access, indexing, and calls
//! to a fixed set of functions and methods.

use std::fmt;

use crate::value::ExprValue;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`!`, `not`).
    Not,
    /// Arithmetic negation (`-`).
    Negate,
    /// Numeric identity (`+`).
    Plus,
}

impl UnaryOp {
    /// Returns the canonical operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
            Self::Plus => "+",
        }
    }
}

/// Binary operators, ordered loosely by precedence class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Logical OR.
    Or,
    /// Logical AND.
    And,
    /// Structural equality.
    Eq,
    /// Structural inequality.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Membership in an array, substring in a string, or key in an object.
    In,
    /// Addition or string concatenation.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Rem,
}

impl BinaryOp {
    /// Returns the canonical operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// SECTION: Expression Nodes
// ============================================================================

/// Parsed expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value.
    Literal(ExprValue),
    /// Bound variable reference.
    Variable(String),
    /// Array literal with element expressions.
    Array(Vec<Expr>),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Property access (`target.property`).
    Member {
        /// Receiver expression.
        target: Box<Expr>,
        /// Property name.
        property: String,
    },
    /// Index access (`target[index]`).
    Index {
        /// Receiver expression.
        target: Box<Expr>,
        /// Index expression.
        index: Box<Expr>,
    },
    /// Free function call (`len(x)`).
    Call {
        /// Function name.
        function: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// Method call on a receiver (`value.includes(x)`).
    MethodCall {
        /// Receiver expression.
        target: Box<Expr>,
        /// Method name.
        method: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Builds a binary node.
    #[must_use]
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds a unary node.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Builds a variable reference.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Builds a literal node.
    #[must_use]
    pub fn literal(value: impl Into<ExprValue>) -> Self {
        Self::Literal(value.into())
    }

    /// Returns true when the node is built only from literals.
    ///
    /// Signed numbers and array literals of constants count as constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Literal(_) => true,
            Self::Array(items) => items.iter().all(Self::is_constant),
            Self::Unary {
                op: UnaryOp::Negate | UnaryOp::Plus,
                operand,
            } => matches!(operand.as_ref(), Self::Literal(ExprValue::Number(_))),
            _ => false,
        }
    }
}
