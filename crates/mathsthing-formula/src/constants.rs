//! Named mathematical constants

use crate::error::{FormulaError, FormulaResult};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

static CONSTANT_TABLE: Lazy<ConstantTable> = Lazy::new(ConstantTable::new);

/// Constant definition
#[derive(Debug, Clone, Copy)]
pub struct ConstantDef {
    /// Constant name (case-sensitive)
    pub name: &'static str,
    /// Value to 28 significant digits where the constant is irrational
    pub value: Decimal,
}

/// Registry of the supported constants
#[derive(Debug)]
pub struct ConstantTable {
    constants: AHashMap<&'static str, ConstantDef>,
    order: Vec<&'static str>,
}

impl ConstantTable {
    /// Create a table holding the built-in constants
    pub fn new() -> Self {
        let mut table = Self {
            constants: AHashMap::new(),
            order: Vec::new(),
        };

        table.register("e", Decimal::E);
        table.register("pi", Decimal::PI);
        table.register("tau", Decimal::TWO_PI);
        table.register("hue", Decimal::from(9001));

        table
    }

    /// The process-wide table
    pub fn global() -> &'static ConstantTable {
        &CONSTANT_TABLE
    }

    fn register(&mut self, name: &'static str, value: Decimal) {
        self.constants.insert(name, ConstantDef { name, value });
        self.order.push(name);
    }

    /// Check whether a constant is supported
    pub fn is_supported(&self, name: &str) -> FormulaResult<bool> {
        if name.is_empty() {
            return Err(FormulaError::InvalidArgument(
                "A constant name must be provided".into(),
            ));
        }
        Ok(self.constants.contains_key(name))
    }

    /// Value of a supported constant
    pub fn resolve(&self, name: &str) -> FormulaResult<Decimal> {
        self.get(name)
            .map(|def| def.value)
            .ok_or_else(|| FormulaError::UnsupportedConstant(name.to_string()))
    }

    /// Look up a constant by name
    pub fn get(&self, name: &str) -> Option<&ConstantDef> {
        self.constants.get(name)
    }

    /// Supported constant names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

impl Default for ConstantTable {
    fn default() -> Self {
        Self::new()
    }
}
