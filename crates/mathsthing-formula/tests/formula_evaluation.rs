//! End-to-end tests for formula evaluation through the public API

use mathsthing_formula::{
    evaluate, evaluate_formula, parse, parse_formula, tokenize, ConstantTable, Decimal,
    ErrorKind, EvaluationOptions, Evaluator, FormulaError, FunctionTable, VariableBindings,
};
use pretty_assertions::assert_eq;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn no_vars() -> VariableBindings {
    VariableBindings::new()
}

fn kind_of(formula: &str) -> ErrorKind {
    evaluate_formula(formula, &no_vars()).unwrap_err().kind()
}

/// Test basic formula evaluation without variables
#[test]
fn test_evaluate_simple_formulas() {
    assert_eq!(evaluate_formula("1+2*3", &no_vars()).unwrap(), dec("7"));
    assert_eq!(evaluate_formula("2+3*4", &no_vars()).unwrap(), dec("14"));
    assert_eq!(evaluate_formula("(2+3)*4", &no_vars()).unwrap(), dec("20"));
    assert_eq!(evaluate_formula(" 1.25 * 8 ", &no_vars()).unwrap(), dec("10"));
}

/// Test each supported constant
#[test]
fn test_evaluate_constants() {
    let table = ConstantTable::global();
    for name in table.names() {
        let result = evaluate_formula(name, &no_vars()).unwrap();
        assert_eq!(result, table.resolve(name).unwrap(), "{name}");
    }
    assert_eq!(
        evaluate_formula("pi", &no_vars()).unwrap().round_dp(15),
        dec("3.141592653589793")
    );
    assert_eq!(evaluate_formula("hue", &no_vars()).unwrap(), dec("9001"));
    assert_eq!(
        evaluate_formula("tau/2", &no_vars()).unwrap().round_dp(15),
        dec("3.141592653589793")
    );
}

/// Test variable substitution
#[test]
fn test_evaluate_with_variables() {
    let mut bindings = VariableBindings::new();
    bindings.insert("x".into(), dec("4"));
    bindings.insert("rate".into(), dec("0.05"));

    assert_eq!(evaluate_formula("x+1", &bindings).unwrap(), dec("5"));
    assert_eq!(evaluate_formula("x*rate*100", &bindings).unwrap(), dec("20"));
    assert_eq!(evaluate_formula("sqrt(x)+x", &bindings).unwrap(), dec("6"));

    let err = evaluate_formula("y+1", &bindings).unwrap_err();
    assert_eq!(err, FormulaError::UnknownSymbol("y".into()));
    assert_eq!(err.to_string(), "Unknown value 'y' found in formula");
}

/// Test nested function calls
#[test]
fn test_evaluate_nested_functions() {
    assert_eq!(evaluate_formula("sqrt(sin(0)+1)", &no_vars()).unwrap(), dec("1"));
    assert_eq!(evaluate_formula("fact(0)", &no_vars()).unwrap(), dec("1"));
    assert_eq!(evaluate_formula("fact(5)", &no_vars()).unwrap(), dec("120"));
    assert_eq!(
        evaluate_formula("fact(fact(3))", &no_vars()).unwrap(),
        dec("720")
    );
    assert_eq!(
        evaluate_formula("round(sqrt(2)*1000)", &no_vars()).unwrap(),
        dec("1414")
    );
    assert_eq!(
        evaluate_formula("floor(log(12345))", &no_vars()).unwrap(),
        dec("4")
    );
}

/// Test the error kinds surfaced to callers
#[test]
fn test_error_kinds() {
    assert_eq!(kind_of(""), ErrorKind::MalformedInput);
    assert_eq!(kind_of("1 & 2"), ErrorKind::MalformedInput);
    assert_eq!(kind_of("(1+2"), ErrorKind::Syntax);
    assert_eq!(kind_of("1+2)"), ErrorKind::Syntax);
    assert_eq!(kind_of("3*"), ErrorKind::Syntax);
    assert_eq!(kind_of("foo(1)"), ErrorKind::UnsupportedOperation);
    assert_eq!(kind_of("sin()"), ErrorKind::MalformedInput);
    assert_eq!(kind_of("y"), ErrorKind::UnknownSymbol);
    assert_eq!(kind_of("5/0"), ErrorKind::DivisionByZero);
    assert_eq!(kind_of("10^29"), ErrorKind::NumericOverflow);
    assert_eq!(kind_of("fact(0-1)"), ErrorKind::Domain);
    assert_eq!(
        kind_of(&vec!["2"; 2000].join("*")),
        ErrorKind::TooManyOperators
    );
}

/// The first error aborts the whole evaluation
#[test]
fn test_first_error_propagates() {
    assert_eq!(
        evaluate_formula("1 + sqrt(2 + fact(3/0))", &no_vars()),
        Err(FormulaError::DivisionByZero)
    );
    assert_eq!(
        evaluate_formula("unknown + 1/0", &no_vars()),
        Err(FormulaError::UnknownSymbol("unknown".into()))
    );
}

/// Test tokenize → parse → evaluate as separate steps
#[test]
fn test_pipeline_steps() {
    let tokens = tokenize("2 * (x + 1)").unwrap();
    assert_eq!(tokens.len(), 7);

    let tree = parse(&tokens).unwrap();
    assert_eq!(tree.to_postfix(), vec!["2", "x", "1", "+", "*"]);
    assert_eq!(tree.to_string(), "(2 * (x + 1))");

    let mut bindings = VariableBindings::new();
    bindings.insert("x".into(), dec("2.5"));
    assert_eq!(evaluate(&tree, &bindings).unwrap(), dec("7"));
}

/// Test custom evaluation options
#[test]
fn test_custom_options() {
    let options = EvaluationOptions::default()
        .with_division_scale(2)
        .with_max_factorial(10);
    let evaluator = Evaluator::new(options);

    assert_eq!(evaluator.evaluate("2/3", &no_vars()).unwrap(), dec("0.67"));
    assert_eq!(evaluator.evaluate("fact(10)", &no_vars()).unwrap(), dec("3628800"));
    assert!(matches!(
        evaluator.evaluate("fact(11)", &no_vars()),
        Err(FormulaError::NumericOverflow(_))
    ));
}

/// Deeply nested input stops at the nesting limit instead of exhausting the stack
#[test]
fn test_deep_nesting_is_rejected() {
    let formula = format!("{}1{}", "(".repeat(500), ")".repeat(500));
    assert_eq!(
        evaluate_formula(&formula, &no_vars()),
        Err(FormulaError::NestingTooDeep { limit: 64 })
    );

    let formula = format!("{}1{}", "sqrt(".repeat(100), ")".repeat(100));
    assert_eq!(
        evaluate_formula(&formula, &no_vars()),
        Err(FormulaError::NestingTooDeep { limit: 64 })
    );
}

/// Long operator chains stop at the operator limit instead of exhausting the stack
#[test]
fn test_long_chain_is_rejected() {
    let formula = vec!["1"; 100_000].join("+");
    assert_eq!(
        evaluate_formula(&formula, &no_vars()),
        Err(FormulaError::TooManyOperators { limit: 1024 })
    );

    // Operators hidden inside function arguments count too
    let formula = format!("sqrt({})", vec!["1"; 100_000].join("*"));
    assert_eq!(
        evaluate_formula(&formula, &no_vars()),
        Err(FormulaError::TooManyOperators { limit: 1024 })
    );

    // A chain right at the limit still evaluates
    let formula = vec!["1"; 1025].join("+");
    assert_eq!(evaluate_formula(&formula, &no_vars()).unwrap(), dec("1025"));
}

/// Test the function table listing
#[test]
fn test_supported_functions() {
    let table = FunctionTable::global();
    let names: Vec<_> = table.names().collect();
    assert_eq!(names.len(), 10);
    for name in names {
        let formula = format!("{name}(1)");
        assert!(
            evaluate_formula(&formula, &no_vars()).is_ok(),
            "{formula} should evaluate"
        );
    }
}

/// Same formula and bindings give identical results, from any thread
#[test]
fn test_concurrent_evaluation() {
    let evaluator = Arc::new(Evaluator::default());
    let expected = evaluator
        .evaluate("sin(x)/3 + fact(4) - tau", &thread_bindings(7))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let evaluator = Arc::clone(&evaluator);
            thread::spawn(move || {
                let bindings = thread_bindings(7);
                evaluator
                    .evaluate("sin(x)/3 + fact(4) - tau", &bindings)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

fn thread_bindings(x: i64) -> VariableBindings {
    let mut bindings = VariableBindings::new();
    bindings.insert("x".into(), Decimal::from(x));
    bindings
}

/// Parsing alone never consults bindings or tables
#[test]
fn test_parse_unknown_names() {
    let tree = parse_formula("foo(1) + bar").unwrap();
    assert_eq!(tree.to_postfix(), vec!["foo(1)", "bar", "+"]);
}
