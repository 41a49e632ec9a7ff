//! # mathsthing-formula
//!
//! Decimal formula engine for the MathsThing calculator.
//!
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Expression tree building with operator precedence (tokens → tree)
//! - Tree evaluation with `rust_decimal` arithmetic (tree → value)
//! - Built-in constants (`e`, `pi`, `tau`, `hue`) and unary functions
//!   (`sin`, `cos`, `tan`, `floor`, `ceil`, `round`, `log`, `ln`, `fact`, `sqrt`)
//!
//! ## Example
//!
//! ```rust
//! use mathsthing_formula::{evaluate_formula, VariableBindings};
//! use rust_decimal::Decimal;
//!
//! let result = evaluate_formula("(2+3)*4", &VariableBindings::new()).unwrap();
//! assert_eq!(result, Decimal::from(20));
//! ```

pub mod ast;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod options;
pub mod parser;

pub use ast::{BinaryOperator, ExpressionNode, Operand};
pub use constants::{ConstantDef, ConstantTable};
pub use error::{ErrorKind, FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_formula, Evaluator, VariableBindings};
pub use functions::{FunctionBody, FunctionDef, FunctionTable, SubFormulaEvaluator};
pub use lexer::{tokenize, Token, TokenKind};
pub use options::EvaluationOptions;
pub use parser::{parse, parse_formula, parse_with_depth, parse_with_limits};
pub use rust_decimal::Decimal;
