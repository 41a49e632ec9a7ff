//! Formula evaluator
//!
//! Evaluates expression trees to decimal values.

use crate::ast::{BinaryOperator, ExpressionNode, Operand};
use crate::constants::ConstantTable;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{FunctionTable, SubFormulaEvaluator};
use crate::lexer::tokenize;
use crate::options::EvaluationOptions;
use crate::parser::parse_with_limits;
use rust_decimal::prelude::*;
use std::collections::HashMap;

/// Variable name (case-sensitive) to value
pub type VariableBindings = HashMap<String, Decimal>;

/// Evaluate a formula string with the default options
///
/// # Example
/// ```rust
/// use mathsthing_formula::{evaluate_formula, VariableBindings};
/// use rust_decimal::Decimal;
///
/// let mut bindings = VariableBindings::new();
/// bindings.insert("x".to_string(), Decimal::from(4));
///
/// let result = evaluate_formula("x+1", &bindings).unwrap();
/// assert_eq!(result, Decimal::from(5));
/// ```
pub fn evaluate_formula(formula: &str, bindings: &VariableBindings) -> FormulaResult<Decimal> {
    Evaluator::default().evaluate(formula, bindings)
}

/// Evaluate an already parsed tree with the default options
pub fn evaluate(tree: &ExpressionNode, bindings: &VariableBindings) -> FormulaResult<Decimal> {
    Evaluator::default().eval(tree, bindings)
}

/// Formula evaluator
///
/// Holds only options and references to the process-wide tables, so one
/// instance can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    options: EvaluationOptions,
    constants: &'static ConstantTable,
    functions: &'static FunctionTable,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluationOptions::default())
    }
}

impl Evaluator {
    /// Create an evaluator with the given options
    pub fn new(options: EvaluationOptions) -> Self {
        Self {
            options,
            constants: ConstantTable::global(),
            functions: FunctionTable::global(),
        }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Tokenize, parse and evaluate a formula
    pub fn evaluate(&self, formula: &str, bindings: &VariableBindings) -> FormulaResult<Decimal> {
        tracing::debug!(formula, variables = bindings.len(), "evaluating formula");
        let result = self.evaluate_at(formula, bindings, 0)?;
        tracing::debug!(formula, %result, "formula evaluated");
        Ok(result)
    }

    /// Evaluate a tree
    pub fn eval(&self, tree: &ExpressionNode, bindings: &VariableBindings) -> FormulaResult<Decimal> {
        self.eval_node(tree, bindings, 0)
    }

    fn evaluate_at(
        &self,
        formula: &str,
        bindings: &VariableBindings,
        depth: usize,
    ) -> FormulaResult<Decimal> {
        if depth > self.options.max_depth {
            return Err(FormulaError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }

        let tokens = tokenize(formula)?;
        // Parentheses inside a function argument share the remaining budget
        let tree = parse_with_limits(
            &tokens,
            self.options.max_depth - depth,
            self.options.max_operators,
        )
        .map_err(|e| match e {
            FormulaError::NestingTooDeep { .. } => FormulaError::NestingTooDeep {
                limit: self.options.max_depth,
            },
            other => other,
        })?;
        self.eval_node(&tree, bindings, depth)
    }

    fn eval_node(
        &self,
        node: &ExpressionNode,
        bindings: &VariableBindings,
        depth: usize,
    ) -> FormulaResult<Decimal> {
        match node {
            ExpressionNode::Leaf(operand) => self.resolve_operand(operand, bindings, depth),
            ExpressionNode::BinaryOp { op, left, right } => {
                let left_val = self.eval_node(left, bindings, depth)?;
                let right_val = self.eval_node(right, bindings, depth)?;
                self.apply_operator(*op, left_val, right_val)
            }
        }
    }

    /// Resolve a leaf: number, then binding, then constant, then function call.
    ///
    /// Constants are only looked up for bare names and the function table only
    /// for call text, since a name never contains parentheses.
    fn resolve_operand(
        &self,
        operand: &Operand,
        bindings: &VariableBindings,
        depth: usize,
    ) -> FormulaResult<Decimal> {
        let text = match operand {
            Operand::Number(n) => return Ok(*n),
            Operand::Symbol(text) | Operand::Call(text) => text,
        };

        if let Some(value) = bindings.get(text) {
            return Ok(*value);
        }

        match operand {
            Operand::Symbol(name) => {
                if self.constants.is_supported(name)? {
                    self.constants.resolve(name)
                } else {
                    Err(FormulaError::UnknownSymbol(name.clone()))
                }
            }
            _ => self.functions.invoke(text, bindings, self, depth),
        }
    }

    /// Combine two operands
    pub fn apply_operator(
        &self,
        op: BinaryOperator,
        left: Decimal,
        right: Decimal,
    ) -> FormulaResult<Decimal> {
        let result = match op {
            BinaryOperator::Add => left.checked_add(right),
            BinaryOperator::Subtract => left.checked_sub(right),
            BinaryOperator::Multiply => left.checked_mul(right),
            BinaryOperator::Divide => Some(self.divide(left, right)?),
            BinaryOperator::Power => Some(self.power(left, right)?),
        };

        result.map(|d| d.normalize()).ok_or_else(|| {
            FormulaError::overflow(format!("{} {} {} is out of range", left, op, right))
        })
    }

    /// Quotient rounded to `division_scale` fractional digits
    fn divide(&self, left: Decimal, right: Decimal) -> FormulaResult<Decimal> {
        if right.is_zero() {
            return Err(FormulaError::DivisionByZero);
        }
        left.checked_div(right)
            .map(|q| q.round_dp_with_strategy(self.options.division_scale, self.options.rounding))
            .ok_or_else(|| FormulaError::overflow(format!("{} / {} is out of range", left, right)))
    }

    /// `base` raised to the truncated integer value of `exponent`.
    ///
    /// A negative exponent raises the reciprocal of `base`, so tiny results
    /// round towards zero and large ones overflow.
    fn power(&self, base: Decimal, exponent: Decimal) -> FormulaResult<Decimal> {
        let exp = exponent.trunc().to_i64().ok_or_else(|| {
            FormulaError::overflow(format!("Exponent {} is out of range", exponent))
        })?;
        let out_of_range =
            || FormulaError::overflow(format!("{} ^ {} is out of range", base, exp));

        if exp >= 0 {
            return checked_powu(base, exp.unsigned_abs()).ok_or_else(out_of_range);
        }

        if base.is_zero() {
            return Err(FormulaError::DivisionByZero);
        }
        let reciprocal = Decimal::ONE.checked_div(base).ok_or_else(out_of_range)?;
        checked_powu(reciprocal, exp.unsigned_abs())
            .map(|p| p.round_dp_with_strategy(self.options.division_scale, self.options.rounding))
            .ok_or_else(out_of_range)
    }
}

impl SubFormulaEvaluator for Evaluator {
    fn evaluate_sub_formula(
        &self,
        formula: &str,
        bindings: &VariableBindings,
        depth: usize,
    ) -> FormulaResult<Decimal> {
        tracing::trace!(formula, depth, "evaluating sub-formula");
        self.evaluate_at(formula, bindings, depth)
    }

    fn options(&self) -> &EvaluationOptions {
        &self.options
    }
}

/// Exponentiation by squaring; `None` on overflow
fn checked_powu(base: Decimal, mut exp: u64) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}
