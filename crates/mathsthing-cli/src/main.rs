//! MathsThing CLI - evaluate decimal formulas from the command line

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mathsthing_formula::{
    parse_formula, ConstantTable, Decimal, EvaluationOptions, Evaluator, FunctionTable,
    VariableBindings,
};
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "mathsthing")]
#[command(author, version, about = "Decimal formula calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula and print the result
    #[command(alias = "calc")]
    Eval {
        /// Formula to evaluate, e.g. "2*(x+1)"
        formula: String,

        /// Variable binding as name=value (repeatable)
        #[arg(short, long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the expression tree of a formula
    Tree {
        /// Formula to parse
        formula: String,

        /// Emit the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the supported functions
    Functions,

    /// List the supported constants and their values
    Constants,
}

#[derive(Args)]
struct OptionArgs {
    /// Fractional digits kept by division (max 28)
    #[arg(long, default_value_t = mathsthing_formula::options::DEFAULT_DIVISION_SCALE)]
    division_scale: u32,

    /// Maximum nesting of parentheses, powers and function calls
    #[arg(long, default_value_t = mathsthing_formula::options::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Largest argument accepted by fact (max 27)
    #[arg(long, default_value_t = mathsthing_formula::options::DEFAULT_MAX_FACTORIAL)]
    max_factorial: u32,

    /// Maximum number of operators in a formula
    #[arg(long, default_value_t = mathsthing_formula::options::DEFAULT_MAX_OPERATORS)]
    max_operators: usize,
}

impl From<OptionArgs> for EvaluationOptions {
    fn from(args: OptionArgs) -> Self {
        EvaluationOptions::default()
            .with_division_scale(args.division_scale)
            .with_max_depth(args.max_depth)
            .with_max_factorial(args.max_factorial)
            .with_max_operators(args.max_operators)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            formula,
            vars,
            options,
        } => eval(&formula, &vars, options.into()),
        Commands::Tree { formula, json } => show_tree(&formula, json),
        Commands::Functions => list_functions(),
        Commands::Constants => list_constants(),
    }
}

/// Log to stderr when RUST_LOG is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn eval(formula: &str, vars: &[String], options: EvaluationOptions) -> Result<()> {
    let bindings = parse_bindings(vars)?;
    tracing::debug!(variables = bindings.len(), ?options, "evaluating from command line");

    let result = Evaluator::new(options)
        .evaluate(formula, &bindings)
        .with_context(|| format!("Failed to evaluate '{}'", formula))?;

    println!("{}", result);
    Ok(())
}

/// Parse `name=value` pairs into variable bindings
fn parse_bindings(vars: &[String]) -> Result<VariableBindings> {
    let mut bindings = VariableBindings::new();
    for var in vars {
        let Some((name, value)) = var.split_once('=') else {
            bail!("Variable '{}' must be written as name=value", var);
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("Variable '{}' has no name", var);
        }
        let value = Decimal::from_str(value.trim())
            .with_context(|| format!("Invalid value for variable '{}'", name))?;
        bindings.insert(name.to_string(), value);
    }
    Ok(bindings)
}

fn show_tree(formula: &str, json: bool) -> Result<()> {
    let tree = parse_formula(formula).with_context(|| format!("Failed to parse '{}'", formula))?;

    if json {
        let text = serde_json::to_string_pretty(&tree).context("Failed to serialize tree")?;
        println!("{}", text);
    } else {
        println!("{}", tree);
        println!("postfix: {}", tree.to_postfix().join(" "));
        println!("height: {}", tree.height());
    }
    Ok(())
}

fn list_functions() -> Result<()> {
    let mut stdout = io::stdout().lock();
    for name in FunctionTable::global().names() {
        writeln!(stdout, "{}(x)", name).context("Failed to write to stdout")?;
    }
    Ok(())
}

fn list_constants() -> Result<()> {
    let table = ConstantTable::global();
    let mut stdout = io::stdout().lock();
    for name in table.names() {
        let value = table.resolve(name)?;
        writeln!(stdout, "{:<4} = {}", name, value).context("Failed to write to stdout")?;
    }
    Ok(())
}
