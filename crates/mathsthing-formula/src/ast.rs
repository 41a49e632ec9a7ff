//! Expression tree types

use rust_decimal::Decimal;
use std::fmt;

/// Binary expression tree.
///
/// Operands sit at the leaves and operators at the interior nodes, so a
/// post-order walk yields the formula in postfix notation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExpressionNode {
    /// Operand leaf
    Leaf(Operand),
    /// Operator applied to two subtrees
    BinaryOp {
        op: BinaryOperator,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
}

/// Leaf operand
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operand {
    /// Numeric literal
    Number(Decimal),
    /// Variable or constant name, resolved at evaluation time
    Symbol(String),
    /// Function call text such as `sin(x+1)`, decomposed when evaluated
    Call(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "^" => Some(BinaryOperator::Power),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Operand {
    /// Source text of the operand
    pub fn text(&self) -> String {
        match self {
            Operand::Number(n) => n.to_string(),
            Operand::Symbol(s) | Operand::Call(s) => s.clone(),
        }
    }
}

impl ExpressionNode {
    pub fn number(value: Decimal) -> Self {
        ExpressionNode::Leaf(Operand::Number(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        ExpressionNode::Leaf(Operand::Symbol(name.into()))
    }

    pub fn call(text: impl Into<String>) -> Self {
        ExpressionNode::Leaf(Operand::Call(text.into()))
    }

    pub fn binary(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ExpressionNode::Leaf(_))
    }

    /// The item stored at this node: an operator symbol or the operand text
    pub fn item(&self) -> String {
        match self {
            ExpressionNode::Leaf(operand) => operand.text(),
            ExpressionNode::BinaryOp { op, .. } => op.symbol().to_string(),
        }
    }

    /// Node items in postfix (post-order) sequence
    pub fn to_postfix(&self) -> Vec<String> {
        let mut items = Vec::new();
        self.collect_postfix(&mut items);
        items
    }

    fn collect_postfix(&self, items: &mut Vec<String>) {
        if let ExpressionNode::BinaryOp { left, right, .. } = self {
            left.collect_postfix(items);
            right.collect_postfix(items);
        }
        items.push(self.item());
    }

    /// Number of levels in the tree; a single leaf has height 1
    pub fn height(&self) -> usize {
        match self {
            ExpressionNode::Leaf(_) => 1,
            ExpressionNode::BinaryOp { left, right, .. } => 1 + left.height().max(right.height()),
        }
    }
}

impl fmt::Display for ExpressionNode {
    /// Fully parenthesised infix form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Leaf(operand) => f.write_str(&operand.text()),
            ExpressionNode::BinaryOp { op, left, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
        }
    }
}
