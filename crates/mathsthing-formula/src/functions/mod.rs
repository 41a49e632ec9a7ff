//! Built-in unary functions
//!
//! Every function takes one argument, which is itself a formula. The table
//! does not parse anything on its own: the caller hands it a
//! [`SubFormulaEvaluator`] that turns the argument text into a value.

pub mod math;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::VariableBindings;
use crate::options::EvaluationOptions;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::fmt;

static FUNCTION_TABLE: Lazy<FunctionTable> = Lazy::new(FunctionTable::new);

/// Capability to evaluate the argument of a function call
pub trait SubFormulaEvaluator {
    /// Tokenize, parse and evaluate `formula` against `bindings`.
    ///
    /// `depth` is the function-call nesting level of `formula`; implementations
    /// reject it once it passes their nesting limit.
    fn evaluate_sub_formula(
        &self,
        formula: &str,
        bindings: &VariableBindings,
        depth: usize,
    ) -> FormulaResult<Decimal>;

    /// Options the function bodies should honor
    fn options(&self) -> &EvaluationOptions;
}

/// How a function computes its result
#[derive(Clone, Copy)]
pub enum FunctionBody {
    /// Computed on `f64`; the argument and result are converted at the boundary
    Float(fn(f64) -> f64),
    /// Computed exactly on the decimal argument
    Exact(fn(Decimal, &EvaluationOptions) -> FormulaResult<Decimal>),
}

impl fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBody::Float(_) => f.write_str("Float"),
            FunctionBody::Exact(_) => f.write_str("Exact"),
        }
    }
}

/// Function definition
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    /// Function name (case-sensitive)
    pub name: &'static str,
    /// Implementation
    pub body: FunctionBody,
}

impl FunctionDef {
    /// Apply the function to an already evaluated argument
    pub fn apply(&self, argument: Decimal, options: &EvaluationOptions) -> FormulaResult<Decimal> {
        match self.body {
            FunctionBody::Float(f) => math::apply_float(self.name, f, argument),
            FunctionBody::Exact(f) => f(argument, options),
        }
    }
}

/// Function registry
#[derive(Debug)]
pub struct FunctionTable {
    functions: AHashMap<&'static str, FunctionDef>,
    order: Vec<&'static str>,
}

impl FunctionTable {
    /// Create a registry with all built-in functions
    pub fn new() -> Self {
        let mut table = Self {
            functions: AHashMap::new(),
            order: Vec::new(),
        };

        table.register_trig_functions();
        table.register_rounding_functions();
        table.register_log_functions();

        table.register("fact", FunctionBody::Exact(math::fn_fact));
        table.register("sqrt", FunctionBody::Float(f64::sqrt));

        table
    }

    /// The process-wide table
    pub fn global() -> &'static FunctionTable {
        &FUNCTION_TABLE
    }

    fn register(&mut self, name: &'static str, body: FunctionBody) {
        self.functions.insert(name, FunctionDef { name, body });
        self.order.push(name);
    }

    fn register_trig_functions(&mut self) {
        self.register("sin", FunctionBody::Float(f64::sin));
        self.register("cos", FunctionBody::Float(f64::cos));
        self.register("tan", FunctionBody::Float(f64::tan));
    }

    fn register_rounding_functions(&mut self) {
        self.register("floor", FunctionBody::Exact(math::fn_floor));
        self.register("ceil", FunctionBody::Exact(math::fn_ceil));
        self.register("round", FunctionBody::Exact(math::fn_round));
    }

    fn register_log_functions(&mut self) {
        self.register("log", FunctionBody::Float(f64::log10));
        self.register("ln", FunctionBody::Float(f64::ln));
    }

    /// Check whether a function is supported
    pub fn is_supported(&self, name: &str) -> FormulaResult<bool> {
        require_name(name)?;
        Ok(self.functions.contains_key(name))
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Supported function names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    /// Evaluate a call such as `sqrt(x+1)`.
    ///
    /// The name is the text before the first `(` and the argument is the text
    /// between the first `(` and the last `)`. `depth` is the nesting level of
    /// the formula containing the call.
    pub fn invoke(
        &self,
        call_text: &str,
        bindings: &VariableBindings,
        evaluator: &dyn SubFormulaEvaluator,
        depth: usize,
    ) -> FormulaResult<Decimal> {
        if call_text.is_empty() {
            return Err(FormulaError::InvalidArgument(
                "A function must be provided".into(),
            ));
        }

        let (name, argument) = split_call(call_text)?;

        if argument.is_empty() {
            return Err(FormulaError::MalformedInput(format!(
                "A parameter must be provided for '{}'",
                name
            )));
        }

        require_name(name)?;
        let def = self
            .get(name)
            .ok_or_else(|| FormulaError::UnsupportedOperation(name.to_string()))?;

        let value = evaluator.evaluate_sub_formula(argument, bindings, depth + 1)?;
        let result = def.apply(value, evaluator.options())?;
        tracing::trace!(function = name, %value, %result, "function applied");
        Ok(result)
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

fn require_name(name: &str) -> FormulaResult<()> {
    if name.is_empty() {
        return Err(FormulaError::InvalidArgument(
            "A function name must be provided".into(),
        ));
    }
    Ok(())
}

/// Split `name(argument)` into trimmed name and argument
fn split_call(call_text: &str) -> FormulaResult<(&str, &str)> {
    let malformed = || {
        FormulaError::MalformedInput(format!(
            "'{}' is not a function call of the form name(argument)",
            call_text
        ))
    };

    let open = call_text.find('(').ok_or_else(malformed)?;
    let close = call_text.rfind(')').ok_or_else(malformed)?;
    if close < open {
        return Err(malformed());
    }

    Ok((
        call_text[..open].trim(),
        call_text[open + 1..close].trim(),
    ))
}
