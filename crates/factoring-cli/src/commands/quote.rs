use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Instant;

use factoring_core::quote::{calculate_financing_quote, FinancingQuote, QuoteDisplay, QuoteInput};
use factoring_core::{with_metadata, Currency};

use crate::input;
use crate::output::CommandOutput;

/// Arguments for a single financing quote
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct QuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Invoice amount to advance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Invoice due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<NaiveDate>,

    /// Currency code or label (PEN, USD, S/, US$)
    #[arg(long)]
    pub currency: Option<String>,

    /// Quote date, today when omitted
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Engine config file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Serialize)]
struct QuoteReport {
    #[serde(flatten)]
    quote: FinancingQuote,
    display: QuoteDisplay,
}

pub fn run_quote(args: QuoteArgs) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    let config = input::file::read_config(args.config.as_deref())?;

    let quote_input: QuoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        QuoteInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            due_date: args
                .due_date
                .ok_or("--due-date is required (or provide --input)")?,
            currency: args
                .currency
                .as_deref()
                .map(Currency::parse)
                .unwrap_or_else(|| config.local_currency.clone()),
            as_of: args.as_of,
        }
    };

    let start = Instant::now();
    let quote = calculate_financing_quote(&quote_input, &config.quote)?;
    let elapsed = start.elapsed().as_micros() as u64;

    let mut warnings = Vec::new();
    if quote.net_amount <= Decimal::ZERO {
        warnings.push("Interest and commission exceed the principal".to_string());
    }

    let report = QuoteReport {
        display: quote.display(),
        quote,
    };
    let output = with_metadata(
        "Simple daily interest on a 30-day month plus fixed commission, rounded half up to cents",
        &config.quote,
        warnings,
        elapsed,
        report,
    );
    Ok(CommandOutput::new(serde_json::to_value(output)?))
}
