//! Tokenizer for recurrence formulas.

use super::ParseError;

/// A lexical token with its byte position in the source text
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f32),
    /// Identifier (variable, constant, or function name)
    Ident(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `=`
    Equals,
    /// `'` (prime marker on the assignment head, as in `Z' = ...`)
    Prime,
}

impl Token {
    /// Human-readable rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number `{n}`"),
            Token::Ident(s) => format!("identifier `{s}`"),
            Token::Plus => "`+`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Slash => "`/`".to_string(),
            Token::Caret => "`^`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::Prime => "`'`".to_string(),
        }
    }
}

/// Split the formula text into tokens, recording byte positions.
pub fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '^' => {
                tokens.push((Token::Caret, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            '=' => {
                tokens.push((Token::Equals, i));
                i += 1;
            }
            '\'' => {
                tokens.push((Token::Prime, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                let literal = &text[start..i];
                let value = literal.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
                    literal: literal.to_string(),
                    position: start,
                })?;
                tokens.push((Token::Number(value), start));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(text[start..i].to_string()), start));
            }
            _ => {
                // Decode from the text, not the byte, so multi-byte
                // characters render intact in the message
                let found = text[i..].chars().next().unwrap_or(c);
                return Err(ParseError::UnexpectedToken {
                    found: format!("`{found}`"),
                    position: i,
                });
            }
        }
    }

    Ok(tokens)
}
