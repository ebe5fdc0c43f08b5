use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Instant;

use factoring_core::batch::{process_receivables, process_receivables_from, CachedSource, Refresh};
use factoring_core::ingest::RawRecord;
use factoring_core::receivables::{DerivationContext, DerivedReceivable};
use factoring_core::with_metadata;

use super::{batch_warnings, ModeArg};
use crate::input;
use crate::input::source::FileSource;
use crate::output::CommandOutput;

/// Arguments for the accounts-receivable batch
#[derive(Args)]
pub struct ReceivablesArgs {
    /// Path to a CSV or JSON rows file (stdin JSON array when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Cutoff date for aging (YYYY-MM-DD)
    #[arg(long)]
    pub cutoff: NaiveDate,

    /// Exchange rate applied to foreign-currency balances
    #[arg(long, alias = "tc")]
    pub exchange_rate: Decimal,

    /// Settlement codes on the overdue list (JSON array or one per line)
    #[arg(long)]
    pub overdue: Option<String>,

    /// Settlement codes under special collections
    #[arg(long)]
    pub special: Option<String>,

    /// Validation mode (defaults to the configured receivables mode)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Engine config file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_receivables(args: ReceivablesArgs) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    let config = input::file::read_config(args.config.as_deref())?;
    let mode = args.mode.map(Into::into).unwrap_or(config.receivables_mode);

    let mut ctx = DerivationContext::new(args.cutoff, args.exchange_rate)
        .with_local_currency(config.local_currency.clone());
    if let Some(ref path) = args.overdue {
        ctx = ctx.with_overdue_codes(input::file::read_code_set(path)?);
    }
    if let Some(ref path) = args.special {
        ctx = ctx.with_special_codes(input::file::read_code_set(path)?);
    }

    let start = Instant::now();
    let result = if let Some(path) = args.input {
        let mut source = CachedSource::new(FileSource::new(path));
        process_receivables_from(&mut source, Refresh::Force, &ctx, mode)
    } else if let Some(rows) = input::stdin::read_stdin::<Vec<RawRecord>>()? {
        process_receivables(&rows, &ctx, mode)
    } else {
        return Err("--input <rows.csv|rows.json> or stdin required for receivables".into());
    };
    let elapsed = start.elapsed().as_micros() as u64;

    let assumptions = json!({
        "cutoff_date": ctx.cutoff_date,
        "exchange_rate": ctx.exchange_rate,
        "local_currency": ctx.local_currency,
        "validation_mode": mode,
        "overdue_codes": ctx.overdue_codes.len(),
        "special_codes": ctx.special_codes.len(),
    });
    let warnings = batch_warnings(&result);
    let output = with_metadata(
        "Accounts receivable: column normalisation, validation, balance and aging derivation",
        &assumptions,
        warnings,
        elapsed,
        result,
    );
    Ok(CommandOutput::new(serde_json::to_value(output)?).with_columns(DerivedReceivable::columns()))
}
