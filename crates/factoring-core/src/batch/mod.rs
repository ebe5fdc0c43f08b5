//! Batch orchestration: coerce, validate and derive every row of a dataset,
//! collecting per-row failures instead of aborting.
//!
//! A row that fails validation lands in [`BatchResult::errors`] with its input
//! index and the batch carries on. A dataset that cannot be fetched at all
//! yields an empty result with [`BatchResult::source_error`] set, so periodic
//! callers always get a well-formed value back.

pub mod cache;

pub use cache::{CachedSource, DataSource, Refresh};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ingest::{validate, RawRecord, Schema, TypedRecord, ValidatedRow, ValidationMode};
use crate::types::Money;
use crate::{FactoringError, FactoringResult};

#[cfg(feature = "cash_position")]
use crate::cash_position::CashPositionRecord;
#[cfg(feature = "receivables")]
use crate::receivables::{derive, AccountsReceivableRecord, DerivationContext, DerivedReceivable};

/// Row-level aggregate inputs.
pub trait BatchRecord {
    /// Balance counted towards [`BatchStats::total_balance`], if known.
    fn balance(&self) -> Option<Money>;
    fn operation_date(&self) -> Option<NaiveDate>;
}

/// A row that was rejected, by zero-based input position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub index: usize,
    pub message: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub record_count: usize,
    pub failed_count: usize,
    pub total_balance: Money,
    pub latest_operation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult<T> {
    /// Successful rows in input order.
    pub records: Vec<T>,
    pub stats: BatchStats,
    pub errors: Vec<RowError>,
    /// Set when the dataset itself could not be obtained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

/// Partial-success report for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub total_balance: Money,
    pub latest_operation_date: Option<NaiveDate>,
    pub failures: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

impl<T> BatchResult<T> {
    /// Empty result carrying a dataset-level failure.
    pub fn from_source_error(error: &FactoringError) -> Self {
        Self {
            records: Vec::new(),
            stats: BatchStats::default(),
            errors: Vec::new(),
            source_error: Some(error.to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.source_error.is_none()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            processed: self.stats.record_count,
            failed: self.stats.failed_count,
            total_balance: self.stats.total_balance,
            latest_operation_date: self.stats.latest_operation_date,
            failures: self.errors.clone(),
            source_error: self.source_error.clone(),
        }
    }
}

/// Validate every row against `schema` and hand the validated row to `build`.
/// Failures from either step are recorded and the batch continues.
pub fn run_batch<T, F>(
    rows: &[RawRecord],
    schema: &Schema,
    mode: ValidationMode,
    mut build: F,
) -> BatchResult<T>
where
    T: BatchRecord,
    F: FnMut(&ValidatedRow<'_>) -> FactoringResult<T>,
{
    let mut records = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, raw) in rows.iter().enumerate() {
        match validate(raw, schema, mode).and_then(|row| build(&row)) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(schema = schema.name(), index, error = %e, "row rejected");
                errors.push(RowError {
                    index,
                    message: e.to_string(),
                    fields: e.fields(),
                });
            }
        }
    }

    let stats = BatchStats {
        record_count: records.len(),
        failed_count: errors.len(),
        total_balance: total_balance(schema.name(), &records),
        latest_operation_date: records.iter().filter_map(BatchRecord::operation_date).max(),
    };

    tracing::info!(
        schema = schema.name(),
        processed = stats.record_count,
        failed = stats.failed_count,
        "batch complete"
    );

    BatchResult {
        records,
        stats,
        errors,
        source_error: None,
    }
}

/// Sum of known balances. Saturates at the `Decimal` bounds instead of
/// failing rows that were already accepted.
fn total_balance<T: BatchRecord>(schema: &str, records: &[T]) -> Money {
    let mut total = Decimal::ZERO;
    let mut saturated = false;
    for balance in records.iter().filter_map(BatchRecord::balance) {
        total = match total.checked_add(balance) {
            Some(sum) => sum,
            None => {
                saturated = true;
                total.saturating_add(balance)
            }
        };
    }
    if saturated {
        tracing::warn!(schema, total = %total, "total balance overflowed and was saturated");
    }
    total
}

/// Load rows from `source` and process them, converting a fetch failure into
/// an empty result.
pub fn run_from_source<S, T, P>(
    source: &mut CachedSource<S>,
    refresh: Refresh,
    process: P,
) -> BatchResult<T>
where
    S: DataSource,
    P: FnOnce(&[RawRecord]) -> BatchResult<T>,
{
    match source.load(refresh) {
        Ok(rows) => process(&rows),
        Err(e) => {
            tracing::warn!(error = %e, "data source failed, returning empty batch");
            BatchResult::from_source_error(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts receivable
// ---------------------------------------------------------------------------

#[cfg(feature = "receivables")]
impl BatchRecord for DerivedReceivable {
    fn balance(&self) -> Option<Money> {
        self.outstanding_balance_converted
    }

    fn operation_date(&self) -> Option<NaiveDate> {
        self.record.operation_date
    }
}

/// Validate and derive a receivables dataset.
#[cfg(feature = "receivables")]
pub fn process_receivables(
    rows: &[RawRecord],
    ctx: &DerivationContext,
    mode: ValidationMode,
) -> BatchResult<DerivedReceivable> {
    run_batch(rows, AccountsReceivableRecord::schema(), mode, |row| {
        AccountsReceivableRecord::from_row(row).and_then(|record| derive(record, ctx))
    })
}

#[cfg(feature = "receivables")]
pub fn process_receivables_from<S: DataSource>(
    source: &mut CachedSource<S>,
    refresh: Refresh,
    ctx: &DerivationContext,
    mode: ValidationMode,
) -> BatchResult<DerivedReceivable> {
    run_from_source(source, refresh, |rows| process_receivables(rows, ctx, mode))
}

// ---------------------------------------------------------------------------
// Cash positions
// ---------------------------------------------------------------------------

#[cfg(feature = "cash_position")]
impl BatchRecord for CashPositionRecord {
    fn balance(&self) -> Option<Money> {
        Some(self.balance)
    }

    fn operation_date(&self) -> Option<NaiveDate> {
        self.operation_date
    }
}

#[cfg(feature = "cash_position")]
pub fn process_cash_positions(
    rows: &[RawRecord],
    mode: ValidationMode,
) -> BatchResult<CashPositionRecord> {
    run_batch(rows, CashPositionRecord::schema(), mode, CashPositionRecord::from_row)
}

#[cfg(feature = "cash_position")]
pub fn process_cash_positions_from<S: DataSource>(
    source: &mut CachedSource<S>,
    refresh: Refresh,
    mode: ValidationMode,
) -> BatchResult<CashPositionRecord> {
    run_from_source(source, refresh, |rows| process_cash_positions(rows, mode))
}
