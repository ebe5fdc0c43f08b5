use clap::Args;
use serde_json::json;
use std::time::Instant;

use factoring_core::batch::{process_cash_positions, process_cash_positions_from, CachedSource, Refresh};
use factoring_core::cash_position::CashPositionRecord;
use factoring_core::ingest::{RawRecord, TypedRecord};
use factoring_core::with_metadata;

use super::{batch_warnings, ModeArg};
use crate::input;
use crate::input::source::FileSource;
use crate::output::CommandOutput;

/// Arguments for the cash-position batch
#[derive(Args)]
pub struct CashPositionsArgs {
    /// Path to a CSV or JSON rows file (stdin JSON array when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Validation mode (defaults to the configured cash-position mode)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Engine config file (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_cash_positions(args: CashPositionsArgs) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    let config = input::file::read_config(args.config.as_deref())?;
    let mode = args.mode.map(Into::into).unwrap_or(config.cash_position_mode);

    let start = Instant::now();
    let result = if let Some(path) = args.input {
        let mut source = CachedSource::new(FileSource::new(path));
        process_cash_positions_from(&mut source, Refresh::Force, mode)
    } else if let Some(rows) = input::stdin::read_stdin::<Vec<RawRecord>>()? {
        process_cash_positions(&rows, mode)
    } else {
        return Err("--input <rows.csv|rows.json> or stdin required for cash positions".into());
    };
    let elapsed = start.elapsed().as_micros() as u64;

    let warnings = batch_warnings(&result);
    let output = with_metadata(
        "Cash positions: column normalisation and lenient coercion",
        &json!({ "validation_mode": mode }),
        warnings,
        elapsed,
        result,
    );
    let columns = CashPositionRecord::schema().column_names();
    Ok(CommandOutput::new(serde_json::to_value(output)?).with_columns(columns))
}
