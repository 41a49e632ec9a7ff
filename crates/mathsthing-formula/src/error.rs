//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during tokenizing, parsing or evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Empty formula, unrecognized character, or a bad function argument
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Unbalanced parentheses or a misplaced operator
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Constant name not present in the constant table
    #[error("Unsupported constant: {0}")]
    UnsupportedConstant(String),

    /// Function name not present in the function table
    #[error("Unsupported function: {0}")]
    UnsupportedOperation(String),

    /// Leaf that is not a number, binding, constant or function call
    #[error("Unknown value '{0}' found in formula")]
    UnknownSymbol(String),

    /// Division (or negative power) with a zero divisor
    #[error("Division by zero")]
    DivisionByZero,

    /// Intermediate value outside the representable finite range
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// Empty name passed to a table lookup
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Function argument outside the function's domain
    #[error("Domain error: {0}")]
    Domain(String),

    /// Parentheses, powers or function calls nested past the configured limit
    #[error("Formula nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// More operators than the configured limit
    #[error("Formula has more than {limit} operators")]
    TooManyOperators { limit: usize },
}

/// Error category, for callers that want to branch without matching payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    Syntax,
    UnsupportedConstant,
    UnsupportedOperation,
    UnknownSymbol,
    DivisionByZero,
    NumericOverflow,
    InvalidArgument,
    Domain,
    NestingTooDeep,
    TooManyOperators,
}

impl FormulaError {
    /// The category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::MalformedInput(_) => ErrorKind::MalformedInput,
            FormulaError::Syntax(_) => ErrorKind::Syntax,
            FormulaError::UnsupportedConstant(_) => ErrorKind::UnsupportedConstant,
            FormulaError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            FormulaError::UnknownSymbol(_) => ErrorKind::UnknownSymbol,
            FormulaError::DivisionByZero => ErrorKind::DivisionByZero,
            FormulaError::NumericOverflow(_) => ErrorKind::NumericOverflow,
            FormulaError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            FormulaError::Domain(_) => ErrorKind::Domain,
            FormulaError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            FormulaError::TooManyOperators { .. } => ErrorKind::TooManyOperators,
        }
    }

    pub(crate) fn overflow<S: Into<String>>(msg: S) -> Self {
        FormulaError::NumericOverflow(msg.into())
    }
}
