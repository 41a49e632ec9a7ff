//! Formula tokenizer
//!
//! Splits formula text into numbers, identifiers, operators and parentheses.

use crate::error::{FormulaError, FormulaResult};
use std::fmt;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    Number,
    Identifier,
    Operator,
    LeftParen,
    RightParen,
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token in the source formula
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Numbers and identifiers
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Number | TokenKind::Identifier)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenize a formula string
///
/// # Example
/// ```rust
/// use mathsthing_formula::{tokenize, TokenKind};
///
/// let tokens = tokenize("sin(x) * 2.5").unwrap();
/// assert_eq!(tokens.len(), 6);
/// assert_eq!(tokens[0].kind, TokenKind::Identifier);
/// assert_eq!(tokens[5].text, "2.5");
/// ```
pub fn tokenize(formula: &str) -> FormulaResult<Vec<Token>> {
    if formula.trim().is_empty() {
        return Err(FormulaError::MalformedInput(
            "A formula must be provided".into(),
        ));
    }

    let mut lexer = Lexer::new(formula);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Render tokens back to formula text.
///
/// Tokens are joined without whitespace, except that two adjacent numbers or
/// identifiers are separated by one space so they stay distinct when the
/// text is tokenized again.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev_word = false;
    for token in tokens {
        if prev_word && token.is_word() {
            out.push(' ');
        }
        out.push_str(&token.text);
        prev_word = token.is_word();
    }
    out
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> FormulaResult<Option<Token>> {
        self.skip_whitespace();

        let start = self.pos;
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(None),
        };

        let kind = match c {
            '+' | '-' | '*' | '/' | '^' => Some(TokenKind::Operator),
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance();
            return Ok(Some(Token::new(kind, c.to_string(), start)));
        }

        if c.is_ascii_digit() || c == '.' {
            return self.scan_number().map(Some);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Some(self.scan_identifier()));
        }

        Err(FormulaError::MalformedInput(format!(
            "Unrecognized character '{}' at position {}",
            c, start
        )))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part, at least one digit after the point
        if self.peek_char() == Some('.') {
            self.advance();
            let digits_start = self.pos;
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
            if self.pos == digits_start {
                return Err(FormulaError::MalformedInput(format!(
                    "Incomplete number '{}' at position {}",
                    &self.input[start..self.pos],
                    start
                )));
            }
        }

        Ok(Token::new(
            TokenKind::Number,
            &self.input[start..self.pos],
            start,
        ))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token::new(TokenKind::Identifier, &self.input[start..self.pos], start)
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}
