//! Math functions

use crate::error::{FormulaError, FormulaResult};
use crate::options::EvaluationOptions;
use rust_decimal::prelude::*;

/// Run an `f64` function on a decimal argument.
///
/// Fails with `NumericOverflow` when the argument has no finite `f64` value
/// or the result is infinite or too large for a decimal, and with `Domain`
/// when the result is NaN.
pub fn apply_float(name: &str, f: fn(f64) -> f64, argument: Decimal) -> FormulaResult<Decimal> {
    let x = argument
        .to_f64()
        .filter(|x| x.is_finite())
        .ok_or_else(|| {
            FormulaError::overflow(format!(
                "Value {} is too large to use in {}",
                argument, name
            ))
        })?;

    let result = f(x);
    if result.is_nan() {
        return Err(FormulaError::Domain(format!(
            "{}({}) is undefined",
            name, argument
        )));
    }

    Decimal::from_f64(result)
        .map(|d| d.normalize())
        .ok_or_else(|| FormulaError::overflow(format!("{}({}) is out of range", name, argument)))
}

/// FLOOR function
pub fn fn_floor(x: Decimal, _options: &EvaluationOptions) -> FormulaResult<Decimal> {
    Ok(x.floor())
}

/// CEIL function
pub fn fn_ceil(x: Decimal, _options: &EvaluationOptions) -> FormulaResult<Decimal> {
    Ok(x.ceil())
}

/// ROUND function (to nearest integer, ties away from zero)
pub fn fn_round(x: Decimal, _options: &EvaluationOptions) -> FormulaResult<Decimal> {
    Ok(x.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// FACT function: factorial of the argument rounded to an integer
pub fn fn_fact(x: Decimal, options: &EvaluationOptions) -> FormulaResult<Decimal> {
    let n = x.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if n.is_sign_negative() && !n.is_zero() {
        return Err(FormulaError::Domain(format!(
            "fact is not defined for negative argument {}",
            n
        )));
    }

    let n = n
        .to_u32()
        .filter(|n| *n <= options.max_factorial)
        .ok_or_else(|| {
            FormulaError::overflow(format!(
                "fact({}) exceeds the largest supported argument {}",
                n, options.max_factorial
            ))
        })?;

    let mut product = Decimal::ONE;
    for k in 2..=n {
        product = product
            .checked_mul(Decimal::from(k))
            .ok_or_else(|| FormulaError::overflow(format!("fact({}) is out of range", n)))?;
    }
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn opts() -> EvaluationOptions {
        EvaluationOptions::default()
    }

    #[test]
    fn test_rounding_functions() {
        assert_eq!(fn_floor(dec("2.7"), &opts()).unwrap(), dec("2"));
        assert_eq!(fn_floor(dec("-2.1"), &opts()).unwrap(), dec("-3"));
        assert_eq!(fn_ceil(dec("2.1"), &opts()).unwrap(), dec("3"));
        assert_eq!(fn_ceil(dec("-2.7"), &opts()).unwrap(), dec("-2"));
        assert_eq!(fn_round(dec("2.5"), &opts()).unwrap(), dec("3"));
        assert_eq!(fn_round(dec("-2.5"), &opts()).unwrap(), dec("-3"));
        assert_eq!(fn_round(dec("2.4"), &opts()).unwrap(), dec("2"));
    }

    #[test]
    fn test_fact() {
        assert_eq!(fn_fact(dec("0"), &opts()).unwrap(), dec("1"));
        assert_eq!(fn_fact(dec("1"), &opts()).unwrap(), dec("1"));
        assert_eq!(fn_fact(dec("5"), &opts()).unwrap(), dec("120"));
        assert_eq!(fn_fact(dec("4.5"), &opts()).unwrap(), dec("120"));
        assert_eq!(fn_fact(dec("-0.4"), &opts()).unwrap(), dec("1"));
        assert_eq!(
            fn_fact(dec("27"), &opts()).unwrap(),
            dec("10888869450418352160768000000")
        );
    }

    #[test]
    fn test_fact_bounds() {
        assert!(matches!(
            fn_fact(dec("-1"), &opts()),
            Err(FormulaError::Domain(_))
        ));
        assert!(matches!(
            fn_fact(dec("28"), &opts()),
            Err(FormulaError::NumericOverflow(_))
        ));
        let small = EvaluationOptions::default().with_max_factorial(5);
        assert!(fn_fact(dec("5"), &small).is_ok());
        assert!(matches!(
            fn_fact(dec("6"), &small),
            Err(FormulaError::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_apply_float() {
        assert_eq!(apply_float("sqrt", f64::sqrt, dec("16")).unwrap(), dec("4"));
        assert_eq!(apply_float("log", f64::log10, dec("100")).unwrap(), dec("2"));
        assert_eq!(apply_float("sin", f64::sin, dec("0")).unwrap(), dec("0"));
        assert_eq!(apply_float("cos", f64::cos, dec("0")).unwrap(), dec("1"));
    }

    #[test]
    fn test_apply_float_domain() {
        assert!(matches!(
            apply_float("sqrt", f64::sqrt, dec("-1")),
            Err(FormulaError::Domain(_))
        ));
        assert!(matches!(
            apply_float("log", f64::log10, dec("-10")),
            Err(FormulaError::Domain(_))
        ));
    }

    #[test]
    fn test_apply_float_overflow() {
        // ln(0) is negative infinity
        assert!(matches!(
            apply_float("ln", f64::ln, dec("0")),
            Err(FormulaError::NumericOverflow(_))
        ));
        assert!(matches!(
            apply_float("exp", f64::exp, dec("1000")),
            Err(FormulaError::NumericOverflow(_))
        ));
    }
}
