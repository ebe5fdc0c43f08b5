use chrono::NaiveDate;
use factoring_core::batch::{process_cash_positions, process_cash_positions_from, CachedSource, Refresh};
use factoring_core::cash_position::CashPositionRecord;
use factoring_core::ingest::coercion::{coerce_date, coerce_money, coerce_tax_id};
use factoring_core::ingest::{record_from_cells, RawRecord, RawValue, TypedRecord, ValidationMode};
use factoring_core::{FactoringError, FactoringResult};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::cell::Cell;

#[test]
fn test_float_ruc_becomes_integer_string() {
    assert_eq!(
        coerce_tax_id(&RawValue::Float(20123456789.0)).unwrap(),
        Some("20123456789".to_string())
    );
    assert_eq!(
        coerce_tax_id(&"20123456789.0".into()).unwrap(),
        Some("20123456789".to_string())
    );
    assert_eq!(coerce_tax_id(&RawValue::Float(f64::NAN)).unwrap(), None);
}

#[test]
fn test_currency_formatted_money() {
    assert_eq!(coerce_money(&"$1,234.50".into()).unwrap(), Some(dec!(1234.50)));
    assert_eq!(coerce_money(&"S/ 2,000".into()).unwrap(), Some(dec!(2000)));
    assert_eq!(coerce_money(&"-".into()).unwrap(), None);
    assert!(coerce_money(&"mil soles".into()).is_err());
}

#[test]
fn test_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2025, 3, 7);
    for text in ["07/03/2025", "2025-03-07", "2025-03-07T23:30:00Z", "2025-03-07 08:15:00"] {
        assert_eq!(coerce_date(&text.into()).unwrap(), expected, "{text}");
    }
}

#[test]
fn test_cash_position_bad_dates_become_null() {
    let headers: Vec<String> = ["Codigo Operacion", "Fecha Operacion", "Saldo"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = vec![
        record_from_cells(&headers, ["OP-1", "", "100"]),
        record_from_cells(&headers, ["OP-2", "30/02/2025", "200"]),
        record_from_cells(&headers, ["OP-3", "14/02/2025", "300"]),
    ];
    let result = process_cash_positions(&rows, CashPositionRecord::default_mode());
    assert!(result.is_complete());
    let dates: Vec<_> = result.records.iter().map(|r| r.operation_date).collect();
    assert_eq!(dates, vec![None, None, NaiveDate::from_ymd_opt(2025, 2, 14)]);
    assert_eq!(result.stats.total_balance, dec!(600));
    assert_eq!(result.stats.latest_operation_date, NaiveDate::from_ymd_opt(2025, 2, 14));
}

#[test]
fn test_cached_source_serves_until_forced() {
    let calls = Cell::new(0u32);
    let source = || -> FactoringResult<Vec<RawRecord>> {
        calls.set(calls.get() + 1);
        let mut row = RawRecord::new();
        row.insert("codigo_operacion".into(), format!("OP-{}", calls.get()).into());
        Ok(vec![row])
    };
    let mut cache = CachedSource::new(source);

    let first = process_cash_positions_from(&mut cache, Refresh::IfEmpty, ValidationMode::Lenient);
    let cached = process_cash_positions_from(&mut cache, Refresh::IfEmpty, ValidationMode::Lenient);
    assert_eq!(first.records, cached.records);
    assert_eq!(calls.get(), 1);

    let forced = process_cash_positions_from(&mut cache, Refresh::Force, ValidationMode::Lenient);
    assert_eq!(calls.get(), 2);
    assert_eq!(forced.records[0].operation_code, "OP-2");
}

#[test]
fn test_source_failure_is_reported_not_raised() {
    let source = || -> FactoringResult<Vec<RawRecord>> {
        Err(FactoringError::DataSource("spreadsheet endpoint returned 500".into()))
    };
    let mut cache = CachedSource::new(source);
    let result = process_cash_positions_from(&mut cache, Refresh::IfEmpty, ValidationMode::Lenient);
    assert!(result.records.is_empty());
    assert!(!result.is_complete());
    let summary = result.summary();
    assert_eq!(summary.processed, 0);
    assert!(summary.source_error.unwrap().contains("returned 500"));
}
