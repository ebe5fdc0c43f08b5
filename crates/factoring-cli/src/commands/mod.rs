pub mod cash_positions;
pub mod quote;
pub mod receivables;

use clap::ValueEnum;
use factoring_core::batch::BatchResult;
use factoring_core::ingest::ValidationMode;

/// Validation mode as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Strict,
    Lenient,
}

impl From<ModeArg> for ValidationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => ValidationMode::Strict,
            ModeArg::Lenient => ValidationMode::Lenient,
        }
    }
}

/// One warning line per rejected row, plus the source failure if any.
pub(crate) fn batch_warnings<T>(result: &BatchResult<T>) -> Vec<String> {
    let mut warnings: Vec<String> = result
        .errors
        .iter()
        .map(|e| format!("row {}: {}", e.index, e.message))
        .collect();
    if let Some(source_error) = &result.source_error {
        warnings.push(format!("dataset unavailable: {}", source_error));
    }
    warnings
}
