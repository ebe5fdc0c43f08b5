mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::cash_positions::CashPositionsArgs;
use commands::quote::QuoteArgs;
use commands::receivables::ReceivablesArgs;

/// Receivables normalisation, cash positions and financing quotes
#[derive(Parser)]
#[command(
    name = "fct",
    version,
    about = "Receivables normalisation, cash positions and financing quotes",
    long_about = "A CLI for cleaning and validating factoring datasets with decimal \
                  precision. Normalises accounts-receivable and cash-position exports, \
                  derives outstanding balances and aging, and prices financing quotes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and derive an accounts-receivable dataset
    Receivables(ReceivablesArgs),
    /// Validate a cash-position (saldos) dataset
    CashPositions(CashPositionsArgs),
    /// Price a financing quote for one invoice
    Quote(QuoteArgs),
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

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result: Result<output::CommandOutput, Box<dyn std::error::Error>> = match cli.command {
        Commands::Receivables(args) => commands::receivables::run_receivables(args),
        Commands::CashPositions(args) => commands::cash_positions::run_cash_positions(args),
        Commands::Quote(args) => commands::quote::run_quote(args),
        Commands::Version => {
            println!("fct {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(rendered) => {
            output::format_output(&cli.output, &rendered);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
