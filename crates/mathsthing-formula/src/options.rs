//! Evaluation options

use rust_decimal::RoundingStrategy;

/// Default number of fractional digits kept by a quotient
pub const DEFAULT_DIVISION_SCALE: u32 = 20;

/// Default nesting limit for parentheses, power chains and function calls
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Largest factorial that fits a 96-bit decimal mantissa
pub const DEFAULT_MAX_FACTORIAL: u32 = 27;

/// Default limit on operators in one formula, function arguments included.
///
/// `+ - * /` chains build one tree level per operator, so this also bounds
/// the height of every tree the evaluator walks.
pub const DEFAULT_MAX_OPERATORS: usize = 1024;

/// Options for formula evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    /// Fractional digits a quotient (or a negative power) is rounded to (default: 20)
    pub division_scale: u32,
    /// Rounding applied at `division_scale` (default: banker's rounding)
    pub rounding: RoundingStrategy,
    /// Maximum nesting depth (default: 64)
    pub max_depth: usize,
    /// Largest argument accepted by `fact` (default: 27)
    pub max_factorial: u32,
    /// Maximum number of operators in a formula (default: 1024)
    pub max_operators: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            division_scale: DEFAULT_DIVISION_SCALE,
            rounding: RoundingStrategy::MidpointNearestEven,
            max_depth: DEFAULT_MAX_DEPTH,
            max_factorial: DEFAULT_MAX_FACTORIAL,
            max_operators: DEFAULT_MAX_OPERATORS,
        }
    }
}

impl EvaluationOptions {
    pub fn with_division_scale(mut self, scale: u32) -> Self {
        // rust_decimal cannot hold more than 28 fractional digits
        self.division_scale = scale.min(28);
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingStrategy) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_factorial(mut self, n: u32) -> Self {
        self.max_factorial = n.min(DEFAULT_MAX_FACTORIAL);
        self
    }

    pub fn with_max_operators(mut self, n: usize) -> Self {
        self.max_operators = n;
        self
    }
}
