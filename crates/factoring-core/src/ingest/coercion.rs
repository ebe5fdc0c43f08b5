//! Per-field coercion of raw cells into typed values.
//!
//! Every coercer returns `Ok(None)` for blank input, `Ok(Some(v))` on success
//! and `Err(CoercionFailure)` when the cell holds something it cannot read.
//! Whether a failure becomes a fallback or a validation error is decided by
//! the validator according to the active [`ValidationMode`](super::ValidationMode).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::raw::RawValue;

/// Coercion outcome for one cell.
pub type Coerced<T> = Result<Option<T>, CoercionFailure>;

/// A non-blank cell that could not be read as the target kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionFailure {
    pub reason: String,
    /// Trimmed text form of the original cell, used for pass-through.
    pub original: String,
}

impl CoercionFailure {
    fn new(value: &RawValue, expected: &str) -> Self {
        Self {
            reason: format!("expected {expected}, got {}", value.describe()),
            original: original_text(value),
        }
    }
}

/// Date layouts tried in order before the timestamp fallbacks.
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Naive timestamp layouts produced by spreadsheet exports.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

const TRUE_LABELS: [&str; 8] = ["true", "1", "yes", "y", "si", "sí", "s", "x"];
const FALSE_LABELS: [&str; 4] = ["false", "0", "no", "n"];

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Trimmed text. Integral floats render without a decimal point.
pub fn coerce_text(value: &RawValue) -> Coerced<String> {
    if value.is_blank() {
        return Ok(None);
    }
    match value {
        RawValue::Text(s) => Ok(Some(s.trim().to_string())),
        RawValue::Int(i) => Ok(Some(i.to_string())),
        RawValue::Float(f) => Ok(Some(float_to_text(*f))),
        RawValue::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(CoercionFailure::new(value, "text")),
    }
}

/// Taxpayer id (RUC). Numeric input is rendered as its integer string so a
/// spreadsheet float like `20123456789.0` becomes `"20123456789"`.
pub fn coerce_tax_id(value: &RawValue) -> Coerced<String> {
    if value.is_blank() {
        return Ok(None);
    }
    match value {
        RawValue::Int(i) => Ok(Some(i.to_string())),
        RawValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(format!("{f:.0}"))),
        RawValue::Text(s) => {
            let s = s.trim();
            if s.contains('.') {
                match Decimal::from_str(s) {
                    Ok(d) if d.fract().is_zero() => Ok(Some(d.trunc().normalize().to_string())),
                    _ => Ok(Some(s.to_string())),
                }
            } else {
                Ok(Some(s.to_string()))
            }
        }
        _ => Err(CoercionFailure::new(value, "taxpayer id")),
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Monetary amount. `-` counts as blank; `$`, `S/`, thousands separators and
/// inner whitespace are stripped before parsing.
pub fn coerce_money(value: &RawValue) -> Coerced<Decimal> {
    if value.is_blank() {
        return Ok(None);
    }
    match value {
        RawValue::Int(i) => Ok(Some(Decimal::from(*i))),
        RawValue::Float(f) => Decimal::try_from(*f)
            .map(Some)
            .map_err(|_| CoercionFailure::new(value, "amount")),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed == "-" {
                return Ok(None);
            }
            let cleaned: String = trimmed
                .replace("S/", "")
                .chars()
                .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
                .collect();
            Decimal::from_str(&cleaned)
                .or_else(|_| Decimal::from_scientific(&cleaned))
                .map(Some)
                .map_err(|_| CoercionFailure::new(value, "amount"))
        }
        _ => Err(CoercionFailure::new(value, "amount")),
    }
}

/// Whole number, accepting integral floats and integral decimal text.
pub fn coerce_integer(value: &RawValue) -> Coerced<i64> {
    if value.is_blank() {
        return Ok(None);
    }
    match value {
        RawValue::Int(i) => Ok(Some(*i)),
        RawValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
            // `as` would saturate silently
            if (i64::MIN as f64..i64::MAX as f64).contains(f) {
                Ok(Some(*f as i64))
            } else {
                Err(CoercionFailure::new(value, "integer"))
            }
        }
        RawValue::Text(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Some(i));
            }
            match Decimal::from_str(s) {
                Ok(d) if d.fract().is_zero() => i64::try_from(d)
                    .map(Some)
                    .map_err(|_| CoercionFailure::new(value, "integer")),
                _ => Err(CoercionFailure::new(value, "integer")),
            }
        }
        _ => Err(CoercionFailure::new(value, "integer")),
    }
}

// ---------------------------------------------------------------------------
// Dates and flags
// ---------------------------------------------------------------------------

/// Calendar date. Timestamps keep only the date as written; time of day and
/// zone are dropped so downstream spreadsheet export never sees a zone.
pub fn coerce_date(value: &RawValue) -> Coerced<NaiveDate> {
    if value.is_blank() {
        return Ok(None);
    }
    let RawValue::Text(s) = value else {
        return Err(CoercionFailure::new(value, "date"));
    };
    parse_date(s.trim())
        .map(Some)
        .ok_or_else(|| CoercionFailure::new(value, "date"))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    for fmt in &DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    for fmt in &DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.date());
        }
    }
    None
}

pub fn coerce_bool(value: &RawValue) -> Coerced<bool> {
    if value.is_blank() {
        return Ok(None);
    }
    match value {
        RawValue::Bool(b) => Ok(Some(*b)),
        RawValue::Int(0) => Ok(Some(false)),
        RawValue::Int(1) => Ok(Some(true)),
        RawValue::Text(s) => {
            let label = s.trim().to_lowercase();
            if TRUE_LABELS.contains(&label.as_str()) {
                Ok(Some(true))
            } else if FALSE_LABELS.contains(&label.as_str()) {
                Ok(Some(false))
            } else {
                Err(CoercionFailure::new(value, "boolean"))
            }
        }
        _ => Err(CoercionFailure::new(value, "boolean")),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn float_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn original_text(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Null => String::new(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Int(i) => i.to_string(),
        RawValue::Float(f) => f.to_string(),
        RawValue::Json(v) => v.to_string(),
    }
}
