//! Cash-position ("saldos") rows from the legacy balance export.
//!
//! Column names in this export drift between runs, so every field accepts
//! several spellings. Amounts default to zero when blank or unreadable and
//! unreadable dates become null; no columns are derived.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::ingest::{
    FieldKind, FieldSpec, LenientInt, Presence, Schema, TypedRecord, ValidatedRow,
    ValidationMode,
};
use crate::types::{Currency, Money};
use crate::FactoringResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashPositionRecord {
    #[serde(rename = "codigo_operacion")]
    pub operation_code: String,
    #[serde(rename = "ruc_cliente")]
    pub client_ruc: Option<String>,
    #[serde(rename = "razon_social")]
    pub client_name: Option<String>,
    #[serde(rename = "ruc_pagador")]
    pub payer_ruc: Option<String>,
    #[serde(rename = "moneda")]
    pub currency: Option<Currency>,
    #[serde(rename = "monto_operacion")]
    pub operation_amount: Money,
    #[serde(rename = "monto_desembolsado")]
    pub disbursed_amount: Money,
    #[serde(rename = "monto_cobrado")]
    pub collected_amount: Money,
    #[serde(rename = "saldo")]
    pub balance: Money,
    #[serde(rename = "fecha_operacion")]
    pub operation_date: Option<NaiveDate>,
    #[serde(rename = "fecha_vencimiento")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "dias_credito")]
    pub credit_days: Option<LenientInt>,
    #[serde(rename = "estado")]
    pub status: Option<String>,
    #[serde(rename = "es_recompra")]
    pub is_repurchase: Option<bool>,
}

static SCHEMA: OnceLock<Schema> = OnceLock::new();

fn build_schema() -> Schema {
    Schema::new(
        "cash_position",
        vec![
            FieldSpec::new(
                "codigo_operacion",
                FieldKind::Text,
                Presence::Required,
                &["CodigoOperacion", "codigooperacion", "Codigo Operación", "operacion"],
            ),
            FieldSpec::new(
                "ruc_cliente",
                FieldKind::TaxId,
                Presence::Optional,
                &["RucCliente", "RUC Cliente", "RUC"],
            ),
            FieldSpec::new(
                "razon_social",
                FieldKind::Text,
                Presence::Optional,
                &["RazonSocial", "Razón Social", "cliente"],
            ),
            FieldSpec::new(
                "ruc_pagador",
                FieldKind::TaxId,
                Presence::Optional,
                &["RucPagador", "RUC Deudor", "ruc_deudor"],
            ),
            FieldSpec::new("moneda", FieldKind::Text, Presence::Optional, &["Moneda", "Divisa"]),
            FieldSpec::new(
                "monto_operacion",
                FieldKind::Money,
                Presence::ZeroDefault,
                &["MontoOperacion", "Monto Operación", "monto"],
            ),
            FieldSpec::new(
                "monto_desembolsado",
                FieldKind::Money,
                Presence::ZeroDefault,
                &["MontoDesembolsado", "Monto Desembolso", "desembolso"],
            ),
            FieldSpec::new(
                "monto_cobrado",
                FieldKind::Money,
                Presence::ZeroDefault,
                &["MontoCobrado", "Monto Cobrado", "cobrado"],
            ),
            FieldSpec::new(
                "saldo",
                FieldKind::Money,
                Presence::ZeroDefault,
                &["Saldo", "SaldoActual", "Saldo Pendiente"],
            ),
            FieldSpec::new(
                "fecha_operacion",
                FieldKind::Date,
                Presence::Optional,
                &["FechaOperacion", "fechaoperacion", "Fecha Operación"],
            ),
            FieldSpec::new(
                "fecha_vencimiento",
                FieldKind::Date,
                Presence::Optional,
                &["FechaVencimiento", "fechavencimiento", "Fecha Vcto"],
            ),
            FieldSpec::new(
                "dias_credito",
                FieldKind::NullableInteger,
                Presence::Optional,
                &["DiasCredito", "Días Crédito", "plazo"],
            ),
            FieldSpec::new("estado", FieldKind::Text, Presence::Optional, &["Estado", "Status"]),
            FieldSpec::new(
                "es_recompra",
                FieldKind::Boolean,
                Presence::Optional,
                &["EsRecompra", "Recompra"],
            ),
        ],
    )
}

impl TypedRecord for CashPositionRecord {
    fn schema() -> &'static Schema {
        SCHEMA.get_or_init(build_schema)
    }

    fn default_mode() -> ValidationMode {
        ValidationMode::Lenient
    }

    fn from_row(row: &ValidatedRow<'_>) -> FactoringResult<Self> {
        Ok(Self {
            operation_code: row.required_text("codigo_operacion")?,
            client_ruc: row.text("ruc_cliente"),
            client_name: row.text("razon_social"),
            payer_ruc: row.text("ruc_pagador"),
            currency: row.text("moneda").map(|c| Currency::parse(&c)),
            operation_amount: row.money("monto_operacion").unwrap_or_default(),
            disbursed_amount: row.money("monto_desembolsado").unwrap_or_default(),
            collected_amount: row.money("monto_cobrado").unwrap_or_default(),
            balance: row.money("saldo").unwrap_or_default(),
            operation_date: row.date("fecha_operacion"),
            due_date: row.date("fecha_vencimiento"),
            credit_days: row.integer("dias_credito"),
            status: row.text("estado"),
            is_repurchase: row.boolean("es_recompra"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{RawRecord, RawValue};
    use rust_decimal_macros::dec;

    fn raw(pairs: &[(&str, RawValue)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn lenient(row: &RawRecord) -> CashPositionRecord {
        CashPositionRecord::from_raw(row, CashPositionRecord::default_mode()).unwrap()
    }

    #[test]
    fn test_column_variants_resolve_to_canonical_fields() {
        for column in ["fecha_operacion", "FechaOperacion", "fechaoperacion", "FECHA OPERACION"] {
            let row = raw(&[("CodigoOperacion", "OP-1".into()), (column, "15/01/2025".into())]);
            assert_eq!(
                lenient(&row).operation_date,
                NaiveDate::from_ymd_opt(2025, 1, 15),
                "column {column}"
            );
        }
    }

    #[test]
    fn test_amounts_default_to_zero() {
        let row = raw(&[
            ("codigo_operacion", "OP-2".into()),
            ("MontoOperacion", "-".into()),
            ("monto_desembolsado", "no disponible".into()),
            ("Saldo", "$12,500.75".into()),
        ]);
        let rec = lenient(&row);
        assert_eq!(rec.operation_amount, dec!(0));
        assert_eq!(rec.disbursed_amount, dec!(0));
        assert_eq!(rec.collected_amount, dec!(0));
        assert_eq!(rec.balance, dec!(12500.75));
    }

    #[test]
    fn test_unparseable_or_blank_date_is_null() {
        for value in ["", "31/31/2025", "pendiente"] {
            let row = raw(&[("codigo_operacion", "OP-3".into()), ("fecha_operacion", value.into())]);
            assert_eq!(lenient(&row).operation_date, None, "value {value:?}");
        }
    }

    #[test]
    fn test_blank_code_is_preserved_and_credit_days_pass_through() {
        let row = raw(&[
            ("codigo_operacion", "".into()),
            ("DiasCredito", "30 dias".into()),
            ("Recompra", "si".into()),
        ]);
        let rec = lenient(&row);
        assert_eq!(rec.operation_code, "");
        assert_eq!(rec.credit_days, Some(LenientInt::Unparsed("30 dias".into())));
        assert_eq!(rec.is_repurchase, Some(true));
    }

    #[test]
    fn test_strict_mode_rejects_what_lenient_tolerates() {
        let row = raw(&[("codigo_operacion", "OP-4".into()), ("fecha_operacion", "pendiente".into())]);
        let err = CashPositionRecord::from_raw(&row, ValidationMode::Strict).unwrap_err();
        assert_eq!(err.fields(), vec!["fecha_operacion"]);
    }

    #[test]
    fn test_out_of_range_credit_days_pass_through() {
        let row = raw(&[("codigo_operacion", "OP-5".into()), ("dias_credito", RawValue::Float(1e19))]);
        let rec = lenient(&row);
        assert!(matches!(rec.credit_days, Some(LenientInt::Unparsed(_))));
    }
}
