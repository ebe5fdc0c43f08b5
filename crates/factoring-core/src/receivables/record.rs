//! Accounts-receivable rows: one confirmed settlement per row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::ingest::{
    FieldKind, FieldSpec, LenientInt, Presence, Schema, TypedRecord, ValidatedRow,
    ValidationMode,
};
use crate::types::{Currency, Money};
use crate::FactoringResult;

/// Payment type vocabulary of the collections system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentType {
    /// No payment registered yet.
    #[default]
    Blank,
    PartialPayment,
    FullPayment,
    /// Partial or unpaid settlement that is on the overdue list.
    OverdueOverride,
    /// Label the vocabulary does not know; kept verbatim.
    Unrecognized(String),
}

impl PaymentType {
    pub const PARTIAL_PAYMENT: &'static str = "PARTIAL_PAYMENT";
    pub const FULL_PAYMENT: &'static str = "FULL_PAYMENT";
    pub const OVERDUE_OVERRIDE: &'static str = "OVERDUE_OVERRIDE";

    /// Exact, case-sensitive match after trimming. Any other spelling is
    /// `Unrecognized` and takes the confirmed-minus-paid balance.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        match label {
            "" => PaymentType::Blank,
            Self::PARTIAL_PAYMENT => PaymentType::PartialPayment,
            Self::FULL_PAYMENT => PaymentType::FullPayment,
            Self::OVERDUE_OVERRIDE => PaymentType::OverdueOverride,
            _ => PaymentType::Unrecognized(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentType::Blank => "",
            PaymentType::PartialPayment => Self::PARTIAL_PAYMENT,
            PaymentType::FullPayment => Self::FULL_PAYMENT,
            PaymentType::OverdueOverride => Self::OVERDUE_OVERRIDE,
            PaymentType::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentType {
    fn from(value: String) -> Self {
        PaymentType::parse(&value)
    }
}

impl From<PaymentType> for String {
    fn from(value: PaymentType) -> Self {
        value.as_str().to_string()
    }
}

/// A validated accounts-receivable row.
///
/// Monetary fields other than the confirmed amount stay `None` when the
/// source cell is blank; an unknown amount is not the same as zero here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsReceivableRecord {
    #[serde(rename = "codigo_liquidacion")]
    pub settlement_code: String,
    #[serde(rename = "ruc_cliente")]
    pub client_ruc: Option<String>,
    #[serde(rename = "razon_social_cliente")]
    pub client_name: Option<String>,
    #[serde(rename = "ruc_pagador")]
    pub payer_ruc: String,
    #[serde(rename = "razon_social_pagador")]
    pub payer_name: Option<String>,
    #[serde(rename = "numero_documento")]
    pub document_number: Option<String>,
    /// `None` when the source left it blank; treated as the local currency.
    #[serde(rename = "moneda")]
    pub currency: Option<Currency>,
    #[serde(rename = "monto_neto_confirmado")]
    pub confirmed_amount: Money,
    #[serde(rename = "monto_pagado")]
    pub amount_paid: Option<Money>,
    #[serde(rename = "saldo_deuda")]
    pub remaining_debt: Option<Money>,
    #[serde(rename = "tipo_pago")]
    pub payment_type: PaymentType,
    #[serde(rename = "fecha_operacion")]
    pub operation_date: Option<NaiveDate>,
    #[serde(rename = "fecha_confirmada")]
    pub confirmation_date: Option<NaiveDate>,
    #[serde(rename = "dias_mora")]
    pub days_overdue: Option<LenientInt>,
    #[serde(rename = "ejecutivo")]
    pub executive: Option<String>,
}

static SCHEMA: OnceLock<Schema> = OnceLock::new();

fn build_schema() -> Schema {
    Schema::new(
        "accounts_receivable",
        vec![
            FieldSpec::new(
                "codigo_liquidacion",
                FieldKind::Text,
                Presence::Required,
                &["CodigoLiquidacion", "Codigo Liquidacion", "codigo", "liquidacion"],
            ),
            FieldSpec::new("ruc_cliente", FieldKind::TaxId, Presence::Optional, &["RucCliente", "RUC Cliente"]),
            FieldSpec::new(
                "razon_social_cliente",
                FieldKind::Text,
                Presence::Optional,
                &["RazonSocialCliente", "Razon Social Cliente", "cliente"],
            ),
            FieldSpec::new("ruc_pagador", FieldKind::TaxId, Presence::Required, &["RucPagador", "RUC Pagador"]),
            FieldSpec::new(
                "razon_social_pagador",
                FieldKind::Text,
                Presence::Optional,
                &["RazonSocialPagador", "Razon Social Pagador", "pagador"],
            ),
            FieldSpec::new(
                "numero_documento",
                FieldKind::Text,
                Presence::Optional,
                &["NumeroDocumento", "Numero Documento", "NroDocumento", "factura"],
            ),
            FieldSpec::new("moneda", FieldKind::Text, Presence::Optional, &["Moneda", "currency"]),
            FieldSpec::new(
                "monto_neto_confirmado",
                FieldKind::Money,
                Presence::Required,
                &["MontoNetoConfirmado", "Monto Neto Confirmado", "NetoConfirmado"],
            ),
            FieldSpec::new("monto_pagado", FieldKind::Money, Presence::Optional, &["MontoPagado", "Monto Pagado"]),
            FieldSpec::new("saldo_deuda", FieldKind::Money, Presence::Optional, &["SaldoDeuda", "Saldo Deuda"]),
            FieldSpec::new("tipo_pago", FieldKind::Text, Presence::Optional, &["TipoPago", "Tipo Pago"]),
            FieldSpec::new(
                "fecha_operacion",
                FieldKind::Date,
                Presence::Optional,
                &["FechaOperacion", "fechaoperacion", "Fecha Operación"],
            ),
            FieldSpec::new(
                "fecha_confirmada",
                FieldKind::Date,
                Presence::Optional,
                &["FechaConfirmada", "fechaconfirmada", "Fecha Confirmación"],
            ),
            FieldSpec::new("dias_mora", FieldKind::NullableInteger, Presence::Optional, &["DiasMora", "Días Mora"]),
            FieldSpec::new("ejecutivo", FieldKind::Text, Presence::Optional, &["Ejecutivo"]),
        ],
    )
}

impl TypedRecord for AccountsReceivableRecord {
    fn schema() -> &'static Schema {
        SCHEMA.get_or_init(build_schema)
    }

    fn default_mode() -> ValidationMode {
        ValidationMode::Strict
    }

    fn from_row(row: &ValidatedRow<'_>) -> FactoringResult<Self> {
        Ok(Self {
            settlement_code: row.required_text("codigo_liquidacion")?,
            client_ruc: row.text("ruc_cliente"),
            client_name: row.text("razon_social_cliente"),
            payer_ruc: row.required_text("ruc_pagador")?,
            payer_name: row.text("razon_social_pagador"),
            document_number: row.text("numero_documento"),
            currency: row.text("moneda").map(|c| Currency::parse(&c)),
            confirmed_amount: row.required_money("monto_neto_confirmado")?,
            amount_paid: row.money("monto_pagado"),
            remaining_debt: row.money("saldo_deuda"),
            payment_type: row
                .text("tipo_pago")
                .map(|t| PaymentType::parse(&t))
                .unwrap_or_default(),
            operation_date: row.date("fecha_operacion"),
            confirmation_date: row.date("fecha_confirmada"),
            days_overdue: row.integer("dias_mora"),
            executive: row.text("ejecutivo"),
        })
    }
}
