mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loan::{MetricsArgs, SolveArgs, ValidateArgs};

/// Fixed-installment loan calculator
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Fixed-installment (Price) loan calculator",
    long_about = "Supply any three of principal, periodic rate, term and installment \
                  and compute the fourth, with decimal precision. The rate is solved \
                  with Newton-Raphson; the others have closed forms."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver decisions and iterations to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the missing quantity from the other three
    Solve(SolveArgs),
    /// Check each supplied field against its acceptance rules
    Validate(ValidateArgs),
    /// Total paid and total interest for a known loan
    Metrics(MetricsArgs),
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
        "amortization_core=debug,amort=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Solve(args) => commands::loan::run_solve(args),
        Commands::Validate(args) => commands::loan::run_validate(args),
        Commands::Metrics(args) => commands::loan::run_metrics(args),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
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
