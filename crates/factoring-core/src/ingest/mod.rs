//! Ingestion of loosely typed tabular rows: coercion, column normalisation
//! and record validation.

pub mod coercion;
pub mod raw;
pub mod schema;
pub mod validator;

pub use raw::{record_from_cells, to_raw_record, RawRecord, RawValue};
pub use schema::{FieldKind, FieldSpec, Presence, Schema, ValidationMode};
pub use validator::{validate, FieldValue, LenientInt, ValidatedRow};

use crate::FactoringResult;

/// A strongly typed record built from a validated row.
pub trait TypedRecord: Sized {
    /// Canonical fields and accepted source spellings.
    fn schema() -> &'static Schema;

    /// Mode used when the caller does not configure one.
    fn default_mode() -> ValidationMode;

    fn from_row(row: &ValidatedRow<'_>) -> FactoringResult<Self>;

    /// Validate and build in one step.
    fn from_raw(raw: &RawRecord, mode: ValidationMode) -> FactoringResult<Self> {
        let row = validate(raw, Self::schema(), mode)?;
        Self::from_row(&row)
    }
}
