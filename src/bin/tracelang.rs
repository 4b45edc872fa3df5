//! Command-line runner for the reference tracelang programs
//!
//! Builds one of the bundled programs, forces it and prints the result.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use tracelang::programs::{self, FactorialVariant};
use tracelang::{DEFAULT_MAX_DEPTH, Engine, EvalConfig, Node};

#[derive(Parser)]
#[command(name = "tracelang")]
#[command(about = "Run the reference tracelang programs")]
#[command(version)]
struct Cli {
    /// Maximum nesting of node computations before giving up
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Log context construction and interventions
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute n! with one of the recursive factorial programs
    Factorial {
        /// Argument of the factorial
        #[arg(short, long, default_value_t = 4)]
        n: i64,
        /// Which program to run
        #[arg(long, value_enum, default_value_t = Variant::Dynamic)]
        variant: Variant,
    },
    /// Run the factorial that never reaches its base case
    BadFactorial {
        /// Argument of the factorial
        #[arg(short, long, default_value_t = 3)]
        n: i64,
    },
    /// Resolve a context built from its own computed intervention
    Dynamic,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    Dynamic,
    Symbolic,
    CallContext,
}

impl From<Variant> for FactorialVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Dynamic => FactorialVariant::Dynamic,
            Variant::Symbolic => FactorialVariant::Symbolic,
            Variant::CallContext => FactorialVariant::CallContext,
        }
    }
}

fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let engine = Engine::new(EvalConfig::builder().max_depth(cli.max_depth).build());

    match cli.command {
        Commands::Factorial { n, variant } => {
            let variant = FactorialVariant::from(variant);
            let node = programs::factorial(&variant.program(), n);
            let value = run(&engine, &node)
                .with_context(|| format!("factorial({n}) with the {variant} program failed"))?;
            println!("{n}! = {value}");
        }
        Commands::BadFactorial { n } => {
            let node = programs::factorial(&programs::bad_factorial(), n);
            match engine.evaluate(&node) {
                Ok(value) => println!("bad factorial unexpectedly returned {value}"),
                Err(e) if e.is_recursion_limit() => println!("bad factorial did not terminate: {e}"),
                Err(e) => return Err(e).context("bad factorial failed"),
            }
        }
        Commands::Dynamic => {
            let node = programs::dynamic_context().index("res");
            let value = run(&engine, &node).context("dynamic context failed")?;
            println!("res = {value}");
        }
    }

    Ok(())
}

fn run(engine: &Engine, node: &Node) -> Result<tracelang::Value> {
    log::info!("forcing {node}");
    Ok(engine.evaluate(node)?)
}
