//! Expression compiler for quaternion recurrences.
//!
//! Turns formula text such as `Z' = Z*Z + C` into a [`CompiledRecurrence`]
//! that maps `(state, constant)` to the next state. The compiled form is a
//! tagged expression tree walked by a plain `match` (fixed dispatch, no
//! runtime code generation), so evaluation is pure, allocation-free and
//! safe to call concurrently from rayon workers.
//!
//! # Grammar
//!
//! ```text
//! formula := [ident ['] '='] expr
//! expr    := term (('+' | '-') term)*
//! term    := factor ('*' factor)*
//! factor  := atom ('^' integer)?
//! atom    := number | 'Z' | 'C' | '(' expr ')' | '-' factor
//! ```
//!
//! Identifiers are case-insensitive. Anything outside this grammar
//! (division, function calls, non-literal or out-of-range exponents)
//! compiles to [`ParseError::UnsupportedOperation`] rather than silently
//! misbehaving.

mod lexer;

use crate::types::Quaternion;
use lexer::{tokenize, Token};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest exponent accepted after `^`
pub const MAX_EXPONENT: u32 = 8;

/// Function names recognized (and rejected) as outside the grammar
const KNOWN_FUNCTIONS: &[&str] = &["sin", "cos", "tan", "exp", "ln", "log", "sqrt", "abs"];

/// Formula compilation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A token that does not fit the grammar at this position
    #[error("unexpected {found} at byte {position}")]
    UnexpectedToken {
        /// Rendering of the offending token
        found: String,
        /// Byte offset in the formula text
        position: usize,
    },

    /// Formula ended mid-expression
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// Malformed numeric literal
    #[error("invalid number `{literal}` at byte {position}")]
    InvalidNumber {
        /// The malformed literal text
        literal: String,
        /// Byte offset in the formula text
        position: usize,
    },

    /// Identifier that is neither the iterated variable nor the constant
    #[error("unknown identifier `{name}` at byte {position}")]
    UnknownIdentifier {
        /// The unrecognized identifier
        name: String,
        /// Byte offset in the formula text
        position: usize,
    },

    /// Leftover tokens after a complete expression
    #[error("trailing input starting at byte {position}")]
    TrailingInput {
        /// Byte offset of the first leftover token
        position: usize,
    },

    /// The formula requires an operator the grammar does not cover
    #[error("unsupported operation {op} at byte {position}")]
    UnsupportedOperation {
        /// Description of the unsupported construct
        op: String,
        /// Byte offset in the formula text
        position: usize,
    },
}

/// Compiled recurrence expression
///
/// Evaluated once per grid point per iteration; shared read-only across
/// worker threads for the duration of an invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// The iterated variable `Z`
    State,
    /// The constant parameter `C`
    Constant,
    /// Real literal
    Literal(f32),
    /// Sum of two subexpressions
    Add(Box<Expr>, Box<Expr>),
    /// Difference of two subexpressions
    Sub(Box<Expr>, Box<Expr>),
    /// Hamilton product of two subexpressions
    Mul(Box<Expr>, Box<Expr>),
    /// Small integer power of a subexpression
    Pow(Box<Expr>, u32),
    /// Negation
    Neg(Box<Expr>),
}

impl Expr {
    /// Evaluate the expression for a given state and constant
    #[inline]
    pub fn eval(&self, state: Quaternion, constant: Quaternion) -> Quaternion {
        match self {
            Expr::State => state,
            Expr::Constant => constant,
            Expr::Literal(r) => Quaternion::from_real(*r),
            Expr::Add(a, b) => a.eval(state, constant) + b.eval(state, constant),
            Expr::Sub(a, b) => a.eval(state, constant) - b.eval(state, constant),
            Expr::Mul(a, b) => a.eval(state, constant) * b.eval(state, constant),
            Expr::Pow(a, n) => a.eval(state, constant).powi(*n),
            Expr::Neg(a) => -a.eval(state, constant),
        }
    }

    /// Number of nodes in the expression tree
    pub fn node_count(&self) -> usize {
        match self {
            Expr::State | Expr::Constant | Expr::Literal(_) => 1,
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
                1 + a.node_count() + b.node_count()
            }
            Expr::Pow(a, _) | Expr::Neg(a) => 1 + a.node_count(),
        }
    }
}

/// A recurrence formula compiled to an evaluable form
///
/// Produced by [`compile`]; reused for every grid point of an invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRecurrence {
    root: Expr,
}

impl CompiledRecurrence {
    /// Apply one iteration step: `next = f(state, constant)`
    #[inline]
    pub fn step(&self, state: Quaternion, constant: Quaternion) -> Quaternion {
        self.root.eval(state, constant)
    }

    /// The compiled expression tree
    pub fn root(&self) -> &Expr {
        &self.root
    }
}

/// Compile a recurrence formula.
///
/// Accepts an optional assignment head (`Z =` or `Z' =`) followed by an
/// expression over `Z`, `C`, real literals, `+`, `-`, `*`, parentheses
/// and `^` with a literal exponent in `0..=8`.
pub fn compile(text: &str) -> Result<CompiledRecurrence, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.skip_assignment_head()?;
    let root = parser.parse_expr()?;
    if let Some((_, position)) = parser.peek() {
        return Err(ParseError::TrailingInput { position });
    }
    Ok(CompiledRecurrence { root })
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(&Token, usize)> {
        self.tokens.get(self.pos).map(|(t, p)| (t, *p))
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    /// Consume `ident ['] =` if the formula starts with one.
    ///
    /// The head must name the iterated variable; `W = ...` is rejected so
    /// a typo does not silently parse as a bare expression.
    fn skip_assignment_head(&mut self) -> Result<(), ParseError> {
        let has_equals = self
            .tokens
            .iter()
            .any(|(t, _)| matches!(t, Token::Equals));
        if !has_equals {
            return Ok(());
        }

        match self.advance() {
            Some((Token::Ident(name), position)) => {
                if !name.eq_ignore_ascii_case("z") {
                    return Err(ParseError::UnknownIdentifier { name, position });
                }
            }
            Some((other, position)) => {
                return Err(ParseError::UnexpectedToken {
                    found: other.describe(),
                    position,
                });
            }
            None => return Err(ParseError::UnexpectedEnd),
        }

        if let Some((Token::Prime, _)) = self.peek() {
            self.advance();
        }

        match self.advance() {
            Some((Token::Equals, _)) => Ok(()),
            Some((other, position)) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                position,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some((Token::Plus, _)) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
                }
                Some((Token::Minus, _)) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            match self.peek() {
                Some((Token::Star, _)) => {
                    self.advance();
                    let rhs = self.parse_factor()?;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some((Token::Slash, position)) => {
                    return Err(ParseError::UnsupportedOperation {
                        op: "division".to_string(),
                        position,
                    });
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_atom()?;
        if let Some((Token::Caret, caret_pos)) = self.peek() {
            self.advance();
            let exponent = self.parse_exponent(caret_pos)?;
            return Ok(Expr::Pow(Box::new(base), exponent));
        }
        Ok(base)
    }

    /// Exponents must be literal non-negative integers no larger than
    /// [`MAX_EXPONENT`]; everything else is outside the grammar.
    fn parse_exponent(&mut self, caret_pos: usize) -> Result<u32, ParseError> {
        match self.advance() {
            Some((Token::Number(n), position)) => {
                if n.fract() != 0.0 {
                    return Err(ParseError::UnsupportedOperation {
                        op: format!("non-integer exponent `{n}`"),
                        position,
                    });
                }
                let n = n as i64;
                if n < 0 || n as u32 > MAX_EXPONENT {
                    return Err(ParseError::UnsupportedOperation {
                        op: format!("exponent `{n}` outside 0..={MAX_EXPONENT}"),
                        position,
                    });
                }
                Ok(n as u32)
            }
            Some((Token::Minus, position)) => Err(ParseError::UnsupportedOperation {
                op: "negative exponent".to_string(),
                position,
            }),
            Some((other, position)) => Err(ParseError::UnsupportedOperation {
                op: format!("non-literal exponent ({})", other.describe()),
                position,
            }),
            None => Err(ParseError::UnsupportedOperation {
                op: "missing exponent".to_string(),
                position: caret_pos,
            }),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(Expr::Literal(n)),
            Some((Token::Ident(name), position)) => {
                if name.eq_ignore_ascii_case("z") {
                    Ok(Expr::State)
                } else if name.eq_ignore_ascii_case("c") {
                    Ok(Expr::Constant)
                } else if KNOWN_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str()) {
                    Err(ParseError::UnsupportedOperation {
                        op: format!("function `{name}`"),
                        position,
                    })
                } else {
                    Err(ParseError::UnknownIdentifier { name, position })
                }
            }
            Some((Token::LParen, open_pos)) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((other, position)) => Err(ParseError::UnexpectedToken {
                        found: other.describe(),
                        position,
                    }),
                    None => Err(ParseError::UnexpectedToken {
                        found: "unclosed `(`".to_string(),
                        position: open_pos,
                    }),
                }
            }
            Some((Token::Minus, _)) => {
                let inner = self.parse_factor()?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some((other, position)) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                position,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(w: f32, x: f32, y: f32, z: f32) -> Quaternion {
        Quaternion::new(w, x, y, z)
    }

    #[test]
    fn test_compile_classic_julia() {
        let rec = compile("Z' = Z*Z + C").unwrap();
        let z = q(0.0, 0.5, 0.25, -0.5);
        let c = q(0.1, 0.0, -0.2, 0.0);
        assert_eq!(rec.step(z, c), z * z + c);
    }

    #[test]
    fn test_compile_without_assignment_head() {
        let with_head = compile("Z = Z^2 + C").unwrap();
        let bare = compile("Z^2 + C").unwrap();
        let z = q(0.3, -0.1, 0.2, 0.05);
        let c = q(0.0, 0.4, 0.0, 0.0);
        assert_eq!(with_head.step(z, c), bare.step(z, c));
    }

    #[test]
    fn test_power_matches_repeated_multiplication() {
        let rec = compile("Z^3").unwrap();
        let z = q(0.2, 0.7, -0.3, 0.4);
        assert_eq!(rec.step(z, Quaternion::ZERO), z * z * z);
    }

    #[test]
    fn test_precedence_and_parens() {
        let rec = compile("Z + C * Z").unwrap();
        let z = q(1.0, 0.5, 0.0, 0.0);
        let c = q(0.0, 2.0, 0.0, 0.0);
        assert_eq!(rec.step(z, c), z + c * z);

        let rec = compile("(Z + C) * Z").unwrap();
        assert_eq!(rec.step(z, c), (z + c) * z);
    }

    #[test]
    fn test_unary_minus_and_literals() {
        let rec = compile("-Z*Z + 0.5*C - 1").unwrap();
        let z = q(0.0, 1.0, 0.0, 0.0);
        let c = q(2.0, 0.0, 0.0, 0.0);
        let expected = (-z) * z + c.scale(0.5) - Quaternion::ONE;
        assert_eq!(rec.step(z, c), expected);
    }

    #[test]
    fn test_case_insensitive_identifiers() {
        let rec = compile("z*z + c").unwrap();
        let z = q(0.0, 0.5, 0.0, 0.0);
        let c = q(0.25, 0.0, 0.0, 0.0);
        assert_eq!(rec.step(z, c), z * z + c);
    }

    #[test]
    fn test_division_is_unsupported() {
        let err = compile("Z / C").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_function_call_is_unsupported() {
        let err = compile("sin(Z) + C").unwrap_err();
        assert!(
            matches!(err, ParseError::UnsupportedOperation { ref op, .. } if op.contains("sin"))
        );
    }

    #[test]
    fn test_exponent_rules() {
        assert!(compile("Z^2").is_ok());
        assert!(compile("Z^0").is_ok());
        assert!(matches!(
            compile("Z^9").unwrap_err(),
            ParseError::UnsupportedOperation { .. }
        ));
        assert!(matches!(
            compile("Z^-2").unwrap_err(),
            ParseError::UnsupportedOperation { .. }
        ));
        assert!(matches!(
            compile("Z^2.5").unwrap_err(),
            ParseError::UnsupportedOperation { .. }
        ));
        assert!(matches!(
            compile("Z^C").unwrap_err(),
            ParseError::UnsupportedOperation { .. }
        ));
    }

    #[test]
    fn test_parse_errors_report_position() {
        match compile("Z + ").unwrap_err() {
            ParseError::UnexpectedEnd => {}
            other => panic!("expected UnexpectedEnd, got {other:?}"),
        }

        match compile("Z + Q").unwrap_err() {
            ParseError::UnknownIdentifier { name, position } => {
                assert_eq!(name, "Q");
                assert_eq!(position, 4);
            }
            other => panic!("expected UnknownIdentifier, got {other:?}"),
        }

        match compile("Z C").unwrap_err() {
            ParseError::TrailingInput { position } => assert_eq!(position, 2),
            other => panic!("expected TrailingInput, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_assignment_head_rejected() {
        assert!(matches!(
            compile("W = Z*Z + C").unwrap_err(),
            ParseError::UnknownIdentifier { .. }
        ));
    }

    #[test]
    fn test_unclosed_paren() {
        assert!(matches!(
            compile("(Z + C").unwrap_err(),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_step_is_pure() {
        let rec = compile("Z*Z + C").unwrap();
        let z = q(0.1, 0.2, 0.3, 0.4);
        let c = q(0.0, 0.0, 0.1, 0.0);
        let first = rec.step(z, c);
        for _ in 0..10 {
            assert_eq!(rec.step(z, c), first);
        }
    }
}
