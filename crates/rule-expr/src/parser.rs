// crates/rule-expr/src/parser.rs
// ============================================================================
// Module: Rule Expression Parser
// Description: Lexer and recursive-descent parser for rule expressions.
// Purpose: Turn author-facing rule text into an `Expr` tree with hard limits.
// Dependencies: crate::{ast, error, eval, value}
// ============================================================================

//! ## Overview
//!
//! Rule expressions are small boolean formulas over bound variables. The
//! parser accepts literals, array literals, the operators listed below, and a
//! fixed set of functions and methods. Names of functions and methods are
//! checked at parse time so a typo is reported as a syntax error instead of
//! surfacing only when a particular value reaches it.
//!
//! ### Grammar (informal, loosest binding first)
//! - `a || b`, `a or b`
//! - `a && b`, `a and b`
//! - `a == b`, `a != b` (`===` and `!==` are accepted as synonyms)
//! - `a < b`, `a <= b`, `a > b`, `a >= b`, `a in b`
//! - `a + b`, `a - b`
//! - `a * b`, `a / b`, `a % b`
//! - `!a`, `not a`, `-a`, `+a`
//! - `a.length`, `a[i]`, `a.includes(x)`, `len(a)`
//! - literals: `12`, `-3.5`, `.5`, `1e3`, `"text"`, `'text'`, `true`, `false`,
//!   `null`, `[1, 2]`; parentheses for grouping

use crate::ast::BinaryOp;
use crate::ast::Expr;
use crate::ast::UnaryOp;
use crate::error::ExprError;
use crate::eval::NoBindings;
use crate::eval::evaluate;
use crate::value::ExprValue;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum expression size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 4096;
/// Default maximum nesting depth; groups, arrays, calls, unary operators,
/// and each link of an operator or postfix chain count one level.
pub const DEFAULT_MAX_NESTING: usize = 32;
/// Maximum size accepted by [`parse_literal`].
const MAX_LITERAL_BYTES: usize = 1024 * 1024;

/// Functions callable without a receiver.
const FUNCTIONS: &[&str] = &["len", "abs", "min", "max"];
/// Methods callable on a receiver.
const METHODS: &[&str] =
    &["includes", "startsWith", "endsWith", "indexOf", "toLowerCase", "toUpperCase", "trim"];

/// Parser limits for untrusted expression input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth.
    pub max_nesting: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses an expression into a syntax tree.
///
/// # Errors
///
/// Returns [`ExprError`] for empty or oversized input, excessive nesting,
/// malformed tokens, unknown functions, or trailing input.
pub fn parse_expression(input: &str, limits: ParseLimits) -> Result<Expr, ExprError> {
    if input.len() > limits.max_input_bytes {
        return Err(ExprError::InputTooLarge {
            max_bytes: limits.max_input_bytes,
            actual_bytes: input.len(),
        });
    }
    let mut lexer = Lexer::new(input);
    let tokens = lexer.lex()?;

    let mut parser = Parser::new(tokens, limits.max_nesting);
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parses literal-only text (numbers, strings, booleans, null, arrays).
///
/// # Errors
///
/// Returns [`ExprError::NotLiteral`] when the text contains names or
/// operators other than a numeric sign, or any syntax error.
pub fn parse_literal(input: &str) -> Result<ExprValue, ExprError> {
    let expr = parse_expression(
        input,
        ParseLimits {
            max_input_bytes: MAX_LITERAL_BYTES,
            max_nesting: DEFAULT_MAX_NESTING,
        },
    )?;
    if !expr.is_constant() {
        return Err(ExprError::NotLiteral);
    }
    evaluate(&expr, &NoBindings)
}

/// Renders `text` as a double-quoted string literal the lexer reads back
/// unchanged.
#[must_use]
pub fn quote_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token produced from expression input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Identifier token.
    Ident(&'a str),
    /// Numeric literal token.
    Number(&'a str),
    /// String literal with escapes resolved.
    Str(String),
    /// `true` keyword.
    True,
    /// `false` keyword.
    False,
    /// `null` keyword.
    Null,
    /// Logical AND operator.
    And,
    /// Logical OR operator.
    Or,
    /// Logical NOT operator.
    Not,
    /// Membership keyword.
    In,
    /// Equality operator.
    EqEq,
    /// Inequality operator.
    NotEq,
    /// Less-than operator.
    Lt,
    /// Less-or-equal operator.
    Le,
    /// Greater-than operator.
    Gt,
    /// Greater-or-equal operator.
    Ge,
    /// Plus sign.
    Plus,
    /// Minus sign.
    Minus,
    /// Multiplication sign.
    Star,
    /// Division sign.
    Slash,
    /// Remainder sign.
    Percent,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// Left bracket.
    LBracket,
    /// Right bracket.
    RBracket,
    /// Comma separator.
    Comma,
    /// Member access dot.
    Dot,
    /// End-of-input marker.
    Eof,
}

/// Token paired with its byte offset.
#[derive(Debug, Clone)]
struct SpannedToken<'a> {
    /// Token value.
    token: Token<'a>,
    /// Byte offset into the input.
    position: usize,
}

/// Lexer for rule expressions.
struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Lexes the input into a sequence of tokens.
    fn lex(&mut self) -> Result<Vec<SpannedToken<'a>>, ExprError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while self.offset < bytes.len() {
            let ch = bytes[self.offset];
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'(' => tokens.push(self.single(Token::LParen)),
                b')' => tokens.push(self.single(Token::RParen)),
                b'[' => tokens.push(self.single(Token::LBracket)),
                b']' => tokens.push(self.single(Token::RBracket)),
                b',' => tokens.push(self.single(Token::Comma)),
                b'+' => tokens.push(self.single(Token::Plus)),
                b'-' => tokens.push(self.single(Token::Minus)),
                b'*' => tokens.push(self.single(Token::Star)),
                b'/' => tokens.push(self.single(Token::Slash)),
                b'%' => tokens.push(self.single(Token::Percent)),
                b'.' if self.peek_char(bytes).is_some_and(|b| b.is_ascii_digit()) => {
                    tokens.push(self.lex_number(bytes));
                }
                b'.' => tokens.push(self.single(Token::Dot)),
                b'=' => {
                    if self.peek_char(bytes) == Some(b'=') {
                        tokens.push(self.equality_run(bytes, Token::EqEq));
                    } else {
                        return Err(ExprError::UnexpectedToken {
                            expected: "`==`",
                            found: "=".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'!' => {
                    if self.peek_char(bytes) == Some(b'=') {
                        tokens.push(self.equality_run(bytes, Token::NotEq));
                    } else {
                        tokens.push(self.single(Token::Not));
                    }
                }
                b'<' => tokens.push(self.with_optional_eq(bytes, Token::Lt, Token::Le)),
                b'>' => tokens.push(self.with_optional_eq(bytes, Token::Gt, Token::Ge)),
                b'&' => tokens.push(self.doubled(bytes, b'&', Token::And, "&&")?),
                b'|' => tokens.push(self.doubled(bytes, b'|', Token::Or, "||")?),
                b'"' | b'\'' => tokens.push(self.lex_string(ch)?),
                b'0' ..= b'9' => tokens.push(self.lex_number(bytes)),
                b'a' ..= b'z' | b'A' ..= b'Z' | b'_' | b'$' => {
                    let start = self.offset;
                    self.consume_while(bytes, |b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
                    let slice = &self.input[start .. self.offset];
                    tokens.push(SpannedToken {
                        token: Self::keyword_or_ident(slice),
                        position: start,
                    });
                }
                _ => {
                    let found = self.input[self.offset ..].chars().next().unwrap_or('?');
                    return Err(ExprError::UnexpectedToken {
                        expected: "literal, identifier, or operator",
                        found: found.to_string(),
                        position: self.offset,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(ExprError::EmptyInput);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Emits a one-byte token and advances past it.
    const fn single(&mut self, token: Token<'a>) -> SpannedToken<'a> {
        let spanned = SpannedToken {
            token,
            position: self.offset,
        };
        self.offset += 1;
        spanned
    }

    /// Emits `short` or, when followed by `=`, `long`.
    fn with_optional_eq(&mut self, bytes: &[u8], short: Token<'a>, long: Token<'a>) -> SpannedToken<'a> {
        let position = self.offset;
        if self.peek_char(bytes) == Some(b'=') {
            self.offset += 2;
            SpannedToken {
                token: long,
                position,
            }
        } else {
            self.offset += 1;
            SpannedToken {
                token: short,
                position,
            }
        }
    }

    /// Emits `==`/`!=`, consuming a third `=` for the strict spelling.
    fn equality_run(&mut self, bytes: &[u8], token: Token<'a>) -> SpannedToken<'a> {
        let position = self.offset;
        self.offset += 2;
        if bytes.get(self.offset) == Some(&b'=') {
            self.offset += 1;
        }
        SpannedToken {
            token,
            position,
        }
    }

    /// Emits a doubled-character operator such as `&&`.
    fn doubled(
        &mut self,
        bytes: &[u8],
        expected_byte: u8,
        token: Token<'a>,
        spelling: &'static str,
    ) -> Result<SpannedToken<'a>, ExprError> {
        if self.peek_char(bytes) == Some(expected_byte) {
            let position = self.offset;
            self.offset += 2;
            Ok(SpannedToken {
                token,
                position,
            })
        } else {
            Err(ExprError::UnexpectedToken {
                expected: spelling,
                found: char::from(expected_byte).to_string(),
                position: self.offset,
            })
        }
    }

    /// Lexes a numeric literal: digits, optional fraction, optional exponent.
    fn lex_number(&mut self, bytes: &[u8]) -> SpannedToken<'a> {
        let start = self.offset;
        self.consume_while(bytes, |b| b.is_ascii_digit());
        if bytes.get(self.offset) == Some(&b'.')
            && bytes.get(self.offset + 1).is_some_and(u8::is_ascii_digit)
        {
            self.offset += 1;
            self.consume_while(bytes, |b| b.is_ascii_digit());
        }
        if matches!(bytes.get(self.offset), Some(b'e' | b'E')) {
            let mut look = self.offset + 1;
            if matches!(bytes.get(look), Some(b'+' | b'-')) {
                look += 1;
            }
            if bytes.get(look).is_some_and(u8::is_ascii_digit) {
                self.offset = look;
                self.consume_while(bytes, |b| b.is_ascii_digit());
            }
        }
        SpannedToken {
            token: Token::Number(&self.input[start .. self.offset]),
            position: start,
        }
    }

    /// Lexes a quoted string literal, resolving escapes.
    fn lex_string(&mut self, quote: u8) -> Result<SpannedToken<'a>, ExprError> {
        let start = self.offset;
        let body = &self.input[start + 1 ..];
        let mut text = String::new();
        let mut chars = body.char_indices();
        while let Some((index, ch)) = chars.next() {
            if ch == char::from(quote) {
                self.offset = start + 1 + index + ch.len_utf8();
                return Ok(SpannedToken {
                    token: Token::Str(text),
                    position: start,
                });
            }
            if ch == '\\' {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                let resolved = match escaped {
                    '"' => '"',
                    '\'' => '\'',
                    '\\' => '\\',
                    '/' => '/',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => {
                        return Err(ExprError::InvalidEscape {
                            escape: other,
                            position: start + 1 + index,
                        });
                    }
                };
                text.push(resolved);
            } else {
                text.push(ch);
            }
        }
        Err(ExprError::UnterminatedString {
            position: start,
        })
    }

    /// Returns the next byte without advancing.
    fn peek_char(&self, bytes: &[u8]) -> Option<u8> {
        bytes.get(self.offset + 1).copied()
    }

    /// Advances while the condition matches the current byte.
    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Maps a slice to a keyword token or identifier token.
    fn keyword_or_ident(slice: &'a str) -> Token<'a> {
        match slice {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            _ => Token::Ident(slice),
        }
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser for rule expressions.
struct Parser<'input> {
    /// Token stream with source positions.
    tokens: Vec<SpannedToken<'input>>,
    /// Current token index.
    index: usize,
    /// Current nesting depth.
    nesting: usize,
    /// Maximum nesting depth.
    max_nesting: usize,
}

impl<'input> Parser<'input> {
    /// Creates a parser over the token stream.
    const fn new(tokens: Vec<SpannedToken<'input>>, max_nesting: usize) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
            max_nesting,
        }
    }

    /// Parses a full expression.
    fn parse_expression(&mut self) -> Result<Expr, ExprError> {
        self.parse_or()
    }

    /// Parses OR chains.
    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        self.parse_chain(Self::parse_and, |token| matches!(token, Token::Or).then_some(BinaryOp::Or))
    }

    /// Parses AND chains.
    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        self.parse_chain(Self::parse_equality, |token| matches!(token, Token::And).then_some(BinaryOp::And))
    }

    /// Parses equality comparisons.
    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        self.parse_chain(Self::parse_comparison, |token| match token {
            Token::EqEq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::NotEq),
            _ => None,
        })
    }

    /// Parses ordering comparisons and membership.
    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        self.parse_chain(Self::parse_additive, |token| match token {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            Token::In => Some(BinaryOp::In),
            _ => None,
        })
    }

    /// Parses addition and subtraction.
    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        self.parse_chain(Self::parse_multiplicative, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    /// Parses multiplication, division, and remainder.
    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        self.parse_chain(Self::parse_unary, |token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    /// Parses a left-associative operator chain.
    ///
    /// Every link deepens the tree by one, so each link is charged against
    /// the nesting limit until the chain ends.
    fn parse_chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ExprError>,
        operator: fn(&Token<'_>) -> Option<BinaryOp>,
    ) -> Result<Expr, ExprError> {
        let base = self.nesting;
        let result = self.parse_chain_links(operand, operator);
        self.nesting = base;
        result
    }

    /// Parses the operands and operators of one chain.
    fn parse_chain_links(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ExprError>,
        operator: fn(&Token<'_>) -> Option<BinaryOp>,
    ) -> Result<Expr, ExprError> {
        let mut left = operand(self)?;
        while let Some(op) = operator(&self.current().token) {
            let position = self.current().position;
            self.advance();
            self.enter(position)?;
            let right = operand(self)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    /// Parses prefix operators.
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.current().token {
            Token::Not => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        let position = self.current().position;
        self.advance();
        self.with_nesting(position, |parser| Ok(Expr::unary(op, parser.parse_unary()?)))
    }

    /// Parses member access, indexing, and method calls.
    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let base = self.nesting;
        let result = self.parse_postfix_links();
        self.nesting = base;
        result
    }

    /// Parses a primary expression and its postfix chain; each link is
    /// charged against the nesting limit.
    fn parse_postfix_links(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(&Token::Dot) {
                let (name, position) = self.expect_ident("property or method name after `.`")?;
                self.enter(position)?;
                if self.matches(&Token::LParen) {
                    if !METHODS.contains(&name) {
                        return Err(ExprError::UnknownFunction {
                            name: name.to_string(),
                            position,
                        });
                    }
                    let args = self.with_nesting(position, Self::parse_call_arguments)?;
                    expr = Expr::MethodCall {
                        target: Box::new(expr),
                        method: name.to_string(),
                        args,
                    };
                } else {
                    expr = Expr::Member {
                        target: Box::new(expr),
                        property: name.to_string(),
                    };
                }
            } else if matches!(self.current().token, Token::LBracket) {
                let position = self.current().position;
                self.advance();
                self.enter(position)?;
                let index = self.with_nesting(position, |parser| {
                    let index = parser.parse_expression()?;
                    parser.expect(&Token::RBracket, "`]` after index")?;
                    Ok(index)
                })?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();
        match token {
            Token::Number(raw) => {
                self.advance();
                let value: f64 = raw.parse().map_err(|_| ExprError::InvalidNumber {
                    raw: raw.to_string(),
                    position,
                })?;
                if !value.is_finite() {
                    return Err(ExprError::InvalidNumber {
                        raw: raw.to_string(),
                        position,
                    });
                }
                Ok(Expr::Literal(ExprValue::Number(value)))
            }
            Token::Str(text) => {
                self.advance();
                Ok(Expr::Literal(ExprValue::String(text)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(ExprValue::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(ExprValue::Bool(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Expr::Literal(ExprValue::Null))
            }
            Token::Ident(name) => {
                self.advance();
                if self.matches(&Token::LParen) {
                    if !FUNCTIONS.contains(&name) {
                        return Err(ExprError::UnknownFunction {
                            name: name.to_string(),
                            position,
                        });
                    }
                    let args = self.with_nesting(position, Self::parse_call_arguments)?;
                    Ok(Expr::Call {
                        function: name.to_string(),
                        args,
                    })
                } else {
                    Ok(Expr::Variable(name.to_string()))
                }
            }
            Token::LParen => {
                self.advance();
                self.with_nesting(position, |parser| {
                    let expr = parser.parse_expression()?;
                    parser.expect(&Token::RParen, "`)`")?;
                    Ok(expr)
                })
            }
            Token::LBracket => {
                self.advance();
                self.with_nesting(position, |parser| {
                    parser.parse_list(&Token::RBracket, "`]` after array elements").map(Expr::Array)
                })
            }
            _ => Err(ExprError::UnexpectedToken {
                expected: "literal, identifier, or `(`",
                found: self.describe_current(),
                position,
            }),
        }
    }

    /// Parses call arguments after an opening parenthesis.
    fn parse_call_arguments(&mut self) -> Result<Vec<Expr>, ExprError> {
        self.parse_list(&Token::RParen, "`)` after arguments")
    }

    /// Parses a comma-separated list terminated by `close`.
    fn parse_list(&mut self, close: &Token<'_>, expected: &'static str) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        if self.matches(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if self.matches(&Token::Comma) {
                continue;
            }
            self.expect(close, expected)?;
            break;
        }
        Ok(items)
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        let base = self.nesting;
        self.enter(position)?;
        let result = f(self);
        self.nesting = base;
        result
    }

    /// Adds one level of nesting, failing past the limit.
    fn enter(&mut self, position: usize) -> Result<(), ExprError> {
        let next_depth = self.nesting + 1;
        if next_depth > self.max_nesting {
            return Err(ExprError::NestingTooDeep {
                max_depth: self.max_nesting,
                actual_depth: next_depth,
                position,
            });
        }
        self.nesting = next_depth;
        Ok(())
    }

    /// Consumes an identifier or returns an error.
    fn expect_ident(&mut self, expected: &'static str) -> Result<(&'input str, usize), ExprError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();
        if let Token::Ident(name) = token {
            self.advance();
            Ok((name, position))
        } else {
            Err(ExprError::UnexpectedToken {
                expected,
                found: self.describe_current(),
                position,
            })
        }
    }

    /// Consumes the expected token or returns an error.
    fn expect(&mut self, token: &Token<'_>, expected: &'static str) -> Result<(), ExprError> {
        if self.matches(token) {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken {
                expected,
                found: self.describe_current(),
                position: self.current().position,
            })
        }
    }

    /// Ensures the parser is at end-of-input.
    fn expect_eof(&self) -> Result<(), ExprError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(ExprError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the token if it matches the expected kind.
    fn matches(&mut self, kind: &Token<'_>) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken<'input> {
        debug_assert!(self.index < self.tokens.len(), "parser index out of bounds");
        &self.tokens[self.index]
    }

    /// Advances to the next token, stopping at end-of-input.
    fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }

    /// Formats the current token for diagnostics.
    fn describe_current(&self) -> String {
        let text = match &self.current().token {
            Token::Ident(name) => return (*name).to_string(),
            Token::Number(raw) => return (*raw).to_string(),
            Token::Str(text) => return quote_str(text),
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::And => "&&",
            Token::Or => "||",
            Token::Not => "!",
            Token::In => "in",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Eof => "end of input",
        };
        text.to_string()
    }
}
