//! Expression tree builder
//!
//! A recursive descent parser over a token sequence with standard operator
//! precedence. Function calls are kept whole as call leaves; their argument
//! is parsed when the call is evaluated.

use crate::ast::{BinaryOperator, ExpressionNode};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{render_tokens, tokenize, Token, TokenKind};
use crate::options::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_OPERATORS};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a formula string into an expression tree
///
/// # Example
/// ```rust
/// use mathsthing_formula::parse_formula;
///
/// let tree = parse_formula("2+3*4").unwrap();
/// assert_eq!(tree.to_postfix(), vec!["2", "3", "4", "*", "+"]);
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<ExpressionNode> {
    let tokens = tokenize(formula)?;
    parse(&tokens)
}

/// Build an expression tree from tokens using the default nesting limit
pub fn parse(tokens: &[Token]) -> FormulaResult<ExpressionNode> {
    parse_with_depth(tokens, DEFAULT_MAX_DEPTH)
}

/// Build an expression tree, failing once parentheses or `^` chains nest
/// deeper than `max_depth`
pub fn parse_with_depth(tokens: &[Token], max_depth: usize) -> FormulaResult<ExpressionNode> {
    parse_with_limits(tokens, max_depth, DEFAULT_MAX_OPERATORS)
}

/// Build an expression tree with explicit nesting and operator limits.
///
/// The operator count covers the whole token slice, including the text of
/// function arguments, so it bounds the height of the returned tree and of
/// every argument tree parsed from it later.
pub fn parse_with_limits(
    tokens: &[Token],
    max_depth: usize,
    max_operators: usize,
) -> FormulaResult<ExpressionNode> {
    if tokens.is_empty() {
        return Err(FormulaError::Syntax("Empty formula".into()));
    }

    let operators = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Operator)
        .count();
    if operators > max_operators {
        return Err(FormulaError::TooManyOperators {
            limit: max_operators,
        });
    }

    let mut parser = TreeBuilder {
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let tree = parser.parse_expression()?;

    // Make sure we consumed all input
    if let Some(token) = parser.current() {
        return Err(match token.kind {
            TokenKind::RightParen => FormulaError::Syntax(format!(
                "Unbalanced parentheses: unexpected ')' at position {}",
                token.position
            )),
            _ => FormulaError::Syntax(format!(
                "Expected an operator before '{}' at position {}",
                token.text, token.position
            )),
        });
    }

    Ok(tree)
}

struct TreeBuilder<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    // === Token cursor ===

    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn current_operator(&self) -> Option<BinaryOperator> {
        self.current()
            .filter(|t| t.kind == TokenKind::Operator)
            .and_then(|t| BinaryOperator::from_symbol(&t.text))
    }

    fn descend(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, - (left associative)
    // 2. Multiplication/Division: *, / (left associative)
    // 3. Exponentiation: ^ (right associative)
    // 4. Primary: numbers, names, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<ExpressionNode> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<ExpressionNode> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_operator() {
                Some(op @ (BinaryOperator::Add | BinaryOperator::Subtract)) => op,
                _ => break,
            };

            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = ExpressionNode::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<ExpressionNode> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current_operator() {
                Some(op @ (BinaryOperator::Multiply | BinaryOperator::Divide)) => op,
                _ => break,
            };

            self.pos += 1;
            let right = self.parse_exponent()?;
            left = ExpressionNode::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<ExpressionNode> {
        let left = self.parse_primary()?;

        if self.current_operator() == Some(BinaryOperator::Power) {
            self.pos += 1;
            self.descend()?;
            let right = self.parse_exponent()?; // Right associative
            self.ascend();
            return Ok(ExpressionNode::binary(BinaryOperator::Power, left, right));
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<ExpressionNode> {
        let token = match self.current() {
            Some(token) => token,
            None => return Err(self.unexpected_end()),
        };

        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                parse_number(token).map(ExpressionNode::number)
            }

            TokenKind::Identifier => {
                if self.peek_kind(1) == Some(TokenKind::LeftParen) {
                    self.parse_function_call()
                } else {
                    self.pos += 1;
                    Ok(ExpressionNode::symbol(token.text.clone()))
                }
            }

            TokenKind::LeftParen => {
                self.pos += 1;
                self.descend()?;
                let expr = self.parse_expression()?;
                match self.current() {
                    Some(t) if t.kind == TokenKind::RightParen => self.pos += 1,
                    _ => {
                        return Err(FormulaError::Syntax(format!(
                            "Unbalanced parentheses: '(' at position {} is never closed",
                            token.position
                        )))
                    }
                }
                self.ascend();
                Ok(expr)
            }

            TokenKind::RightParen => Err(FormulaError::Syntax(format!(
                "Unexpected ')' at position {}",
                token.position
            ))),

            TokenKind::Operator => Err(FormulaError::Syntax(format!(
                "Misplaced operator '{}' at position {}",
                token.text, token.position
            ))),
        }
    }

    /// Capture `name ( ... )` up to the matching parenthesis as one call leaf
    fn parse_function_call(&mut self) -> FormulaResult<ExpressionNode> {
        let start = self.pos;
        let name = &self.tokens[start];
        let mut open = 0usize;

        for (offset, token) in self.tokens[start + 1..].iter().enumerate() {
            match token.kind {
                TokenKind::LeftParen => open += 1,
                TokenKind::RightParen => {
                    open -= 1;
                    if open == 0 {
                        let end = start + 1 + offset;
                        self.pos = end + 1;
                        return Ok(ExpressionNode::call(render_tokens(
                            &self.tokens[start..=end],
                        )));
                    }
                }
                _ => {}
            }
        }

        Err(FormulaError::Syntax(format!(
            "Unbalanced parentheses in call to '{}' at position {}",
            name.text, name.position
        )))
    }

    fn unexpected_end(&self) -> FormulaError {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(prev) if prev.kind == TokenKind::Operator => FormulaError::Syntax(format!(
                "Formula ends with operator '{}'",
                prev.text
            )),
            _ => FormulaError::Syntax("Unexpected end of formula".into()),
        }
    }
}

fn parse_number(token: &Token) -> FormulaResult<Decimal> {
    let text = if token.text.starts_with('.') {
        format!("0{}", token.text)
    } else {
        token.text.clone()
    };
    Decimal::from_str(&text).map_err(|_| {
        FormulaError::overflow(format!("Number '{}' is out of range", token.text))
    })
}
