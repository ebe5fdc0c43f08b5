//! Untyped input rows as they arrive from spreadsheets, CSV exports and
//! scripted endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::FactoringResult;

/// One untrusted scalar cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Nested arrays/objects. Never coercible to a scalar field.
    Json(serde_json::Value),
}

impl RawValue {
    /// Null, NaN and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Float(f) => f.is_nan(),
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Short human-readable rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            RawValue::Null => "null".to_string(),
            RawValue::Bool(b) => b.to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) => f.to_string(),
            RawValue::Text(s) => format!("'{s}'"),
            RawValue::Json(v) => v.to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// Column name to raw cell. Column names are whatever the source used.
pub type RawRecord = BTreeMap<String, RawValue>;

/// Build a raw record from any serialisable row, e.g. to feed derived
/// output back through the pipeline.
pub fn to_raw_record<T: Serialize>(row: &T) -> FactoringResult<RawRecord> {
    let value = serde_json::to_value(row)?;
    Ok(serde_json::from_value(value)?)
}

/// Build a raw record from CSV-style header/cell pairs. Every cell is text.
pub fn record_from_cells<'a, I>(headers: &[String], cells: I) -> RawRecord
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .iter()
        .cloned()
        .zip(cells.into_iter().map(RawValue::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_json_row() {
        let row: RawRecord = serde_json::from_str(
            r#"{"a": null, "b": 12, "c": 20123456789.0, "d": " x ", "e": true, "f": [1]}"#,
        )
        .unwrap();
        assert_eq!(row["a"], RawValue::Null);
        assert_eq!(row["b"], RawValue::Int(12));
        assert_eq!(row["c"], RawValue::Float(20123456789.0));
        assert_eq!(row["d"], RawValue::Text(" x ".into()));
        assert_eq!(row["e"], RawValue::Bool(true));
        assert!(matches!(row["f"], RawValue::Json(_)));
    }

    #[test]
    fn test_blank_detection() {
        assert!(RawValue::Null.is_blank());
        assert!(RawValue::Float(f64::NAN).is_blank());
        assert!(RawValue::from("   ").is_blank());
        assert!(!RawValue::from("-").is_blank());
        assert!(!RawValue::Int(0).is_blank());
    }

    #[test]
    fn test_record_from_cells() {
        let headers = vec!["Moneda".to_string(), "Saldo".to_string()];
        let row = record_from_cells(&headers, ["PEN", "1,000"]);
        assert_eq!(row["Moneda"], RawValue::from("PEN"));
        assert_eq!(row["Saldo"], RawValue::from("1,000"));
    }
}
