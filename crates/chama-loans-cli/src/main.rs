mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::affordability::AffordabilityArgs;
use commands::lending::{AmortizeArgs, ProductsArgs, QuoteArgs};

/// Loan calculations for chama group lending
#[derive(Parser)]
#[command(
    name = "chama",
    version,
    about = "Loan calculations for chama group lending",
    long_about = "A CLI for chama loan calculations with decimal precision. Supports \
                  level-payment amortization schedules, loan quotes against a product \
                  catalog, and borrowing capacity for a monthly budget."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a level-payment amortization schedule
    Amortize(AmortizeArgs),
    /// Quote a loan against a product from a catalog file
    Quote(QuoteArgs),
    /// Maximum principal affordable for a monthly installment
    Affordability(AffordabilityArgs),
    /// List and validate the loan products in a catalog file
    Products(ProductsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chama=debug,chama_loans_core=debug"
    } else {
        "chama=info,chama_loans_core=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries the result; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::lending::run_amortize(args),
        Commands::Quote(args) => commands::lending::run_quote(args),
        Commands::Affordability(args) => commands::affordability::run_affordability(args),
        Commands::Products(args) => commands::lending::run_products(args),
        Commands::Version => {
            println!("chama {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
