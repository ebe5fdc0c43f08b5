//! Derived balance and status columns for accounts-receivable rows.
//!
//! The five derivations run in a fixed order on each record. Each one reads
//! only the record and values computed earlier in the same pass, so feeding
//! derived output back in as raw input reproduces the same values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::record::{AccountsReceivableRecord, PaymentType};
use crate::ingest::TypedRecord;
use crate::types::{Currency, Money, Rate};
use crate::{FactoringError, FactoringResult};

/// Aging classification of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Current,
    Overdue,
    SpecialCollections,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountStatus::Current => "CURRENT",
            AccountStatus::Overdue => "OVERDUE",
            AccountStatus::SpecialCollections => "SPECIAL_COLLECTIONS",
        };
        f.write_str(label)
    }
}

/// External inputs of a derivation run: the cutoff date, the exchange rate
/// into local currency and the two reference sets of settlement codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationContext {
    pub cutoff_date: NaiveDate,
    /// Units of local currency per unit of foreign currency.
    pub exchange_rate: Rate,
    #[serde(default)]
    pub local_currency: Currency,
    /// Settlements overdue as of the cutoff.
    #[serde(default)]
    pub overdue_codes: HashSet<String>,
    /// Settlements handed to special collections.
    #[serde(default)]
    pub special_codes: HashSet<String>,
}

impl DerivationContext {
    pub fn new(cutoff_date: NaiveDate, exchange_rate: Rate) -> Self {
        Self {
            cutoff_date,
            exchange_rate,
            local_currency: Currency::default(),
            overdue_codes: HashSet::new(),
            special_codes: HashSet::new(),
        }
    }

    pub fn with_local_currency(mut self, currency: Currency) -> Self {
        self.local_currency = currency;
        self
    }

    pub fn with_overdue_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overdue_codes = codes.into_iter().map(|c| c.into().trim().to_string()).collect();
        self
    }

    pub fn with_special_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_codes = codes.into_iter().map(|c| c.into().trim().to_string()).collect();
        self
    }
}

/// A receivable together with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedReceivable {
    #[serde(flatten)]
    pub record: AccountsReceivableRecord,
    /// Balance still owed, in the settlement currency. `None` when the
    /// amount it depends on is unknown.
    #[serde(rename = "saldo_pendiente")]
    pub outstanding_balance: Option<Money>,
    #[serde(rename = "saldo_pendiente_convertido")]
    pub outstanding_balance_converted: Option<Money>,
    #[serde(rename = "tipo_pago_real")]
    pub real_payment_type: PaymentType,
    #[serde(rename = "estado_cuenta")]
    pub account_status: AccountStatus,
    #[serde(rename = "estado_real")]
    pub real_status: AccountStatus,
}

/// Output column names of the derived fields, in derivation order.
pub const DERIVED_COLUMNS: [&str; 5] = [
    "saldo_pendiente",
    "saldo_pendiente_convertido",
    "tipo_pago_real",
    "estado_cuenta",
    "estado_real",
];

impl DerivedReceivable {
    /// Canonical input columns followed by the derived ones.
    pub fn columns() -> Vec<&'static str> {
        let mut columns = AccountsReceivableRecord::schema().column_names();
        columns.extend(DERIVED_COLUMNS);
        columns
    }
}

/// Run all derivations on one record.
///
/// Fails only when a balance does not fit in a `Decimal`.
pub fn derive(
    record: AccountsReceivableRecord,
    ctx: &DerivationContext,
) -> FactoringResult<DerivedReceivable> {
    let outstanding_balance = outstanding_balance(&record)?;
    let outstanding_balance_converted = converted_balance(outstanding_balance, &record, ctx)?;
    let real_payment_type = real_payment_type(&record, ctx);
    let account_status = account_status(record.confirmation_date, ctx.cutoff_date);
    let real_status = real_status(account_status, &record, ctx);

    Ok(DerivedReceivable {
        record,
        outstanding_balance,
        outstanding_balance_converted,
        real_payment_type,
        account_status,
        real_status,
    })
}

/// Partial payments owe their remaining debt; unpaid settlements owe the full
/// confirmed amount; everything else owes confirmed minus paid.
pub fn outstanding_balance(record: &AccountsReceivableRecord) -> FactoringResult<Option<Money>> {
    match &record.payment_type {
        PaymentType::PartialPayment => Ok(record.remaining_debt),
        PaymentType::Blank => Ok(Some(record.confirmed_amount)),
        other => {
            if let PaymentType::Unrecognized(label) = other {
                tracing::warn!(
                    settlement = %record.settlement_code,
                    payment_type = %label,
                    "unrecognised payment type, balance computed as confirmed minus paid"
                );
            }
            record
                .amount_paid
                .map(|paid| {
                    record
                        .confirmed_amount
                        .checked_sub(paid)
                        .ok_or_else(|| overflow("saldo_pendiente"))
                })
                .transpose()
        }
    }
}

/// Balances in the local currency pass through; anything else, including a
/// blank currency, is multiplied by the exchange rate.
pub fn converted_balance(
    balance: Option<Money>,
    record: &AccountsReceivableRecord,
    ctx: &DerivationContext,
) -> FactoringResult<Option<Money>> {
    let is_local = matches!(&record.currency, Some(c) if *c == ctx.local_currency);
    balance
        .map(|b| {
            if is_local {
                Ok(b)
            } else {
                b.checked_mul(ctx.exchange_rate)
                    .ok_or_else(|| overflow("saldo_pendiente_convertido"))
            }
        })
        .transpose()
}

/// Overrides an unpaid or partially paid type when the settlement is on the
/// overdue list. Never replaces a more specific type.
pub fn real_payment_type(record: &AccountsReceivableRecord, ctx: &DerivationContext) -> PaymentType {
    match record.payment_type {
        PaymentType::PartialPayment | PaymentType::Blank
            if ctx.overdue_codes.contains(&record.settlement_code) =>
        {
            PaymentType::OverdueOverride
        }
        _ => record.payment_type.clone(),
    }
}

/// A settlement confirmed on or before the cutoff is overdue. A missing
/// confirmation date counts as current; this is a reviewed business rule,
/// not an unknown.
pub fn account_status(confirmation_date: Option<NaiveDate>, cutoff: NaiveDate) -> AccountStatus {
    match confirmation_date {
        Some(date) if date <= cutoff => AccountStatus::Overdue,
        _ => AccountStatus::Current,
    }
}

pub fn real_status(
    status: AccountStatus,
    record: &AccountsReceivableRecord,
    ctx: &DerivationContext,
) -> AccountStatus {
    if status == AccountStatus::Overdue && ctx.special_codes.contains(&record.settlement_code) {
        AccountStatus::SpecialCollections
    } else {
        status
    }
}

fn overflow(column: &str) -> FactoringError {
    FactoringError::ArithmeticOverflow {
        context: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(code: &str, payment_type: PaymentType) -> AccountsReceivableRecord {
        AccountsReceivableRecord {
            settlement_code: code.into(),
            client_ruc: Some("10456789012".into()),
            client_name: Some("Cliente SAC".into()),
            payer_ruc: "20123456789".into(),
            payer_name: Some("Pagador SA".into()),
            document_number: Some("F001-123".into()),
            currency: Some(Currency::PEN),
            confirmed_amount: dec!(1000),
            amount_paid: Some(dec!(250)),
            remaining_debt: Some(dec!(400)),
            payment_type,
            operation_date: Some(date(2024, 4, 1)),
            confirmation_date: Some(date(2024, 5, 31)),
            days_overdue: None,
            executive: None,
        }
    }

    fn ctx() -> DerivationContext {
        DerivationContext::new(date(2024, 6, 15), dec!(3.75))
    }

    #[test]
    fn test_outstanding_balance_branches() {
        assert_eq!(outstanding_balance(&record("A", PaymentType::Blank)).unwrap(), Some(dec!(1000)));
        assert_eq!(
            outstanding_balance(&record("A", PaymentType::PartialPayment)).unwrap(),
            Some(dec!(400))
        );
        let mut full = record("A", PaymentType::FullPayment);
        full.amount_paid = Some(dec!(1000));
        assert_eq!(outstanding_balance(&full).unwrap(), Some(dec!(0)));
    }

    #[test]
    fn test_blank_type_ignores_amount_paid() {
        let mut rec = record("A", PaymentType::Blank);
        rec.amount_paid = Some(dec!(999));
        assert_eq!(outstanding_balance(&rec).unwrap(), Some(dec!(1000)));
    }

    #[test]
    fn test_unrecognised_type_falls_to_subtraction() {
        let rec = record("A", PaymentType::Unrecognized("REPROGRAMADO".into()));
        assert_eq!(outstanding_balance(&rec).unwrap(), Some(dec!(750)));
    }

    #[test]
    fn test_unknown_amounts_give_unknown_balance() {
        let mut partial = record("A", PaymentType::PartialPayment);
        partial.remaining_debt = None;
        assert_eq!(outstanding_balance(&partial).unwrap(), None);

        let mut full = record("A", PaymentType::FullPayment);
        full.amount_paid = None;
        assert_eq!(outstanding_balance(&full).unwrap(), None);
    }

    #[test]
    fn test_conversion_only_for_foreign_currency() {
        let ctx = ctx();
        let mut rec = record("A", PaymentType::Blank);
        assert_eq!(converted_balance(Some(dec!(100)), &rec, &ctx).unwrap(), Some(dec!(100)));

        rec.currency = Some(Currency::USD);
        assert_eq!(converted_balance(Some(dec!(100)), &rec, &ctx).unwrap(), Some(dec!(375)));

        // blank currency is not the local code
        rec.currency = None;
        assert_eq!(converted_balance(Some(dec!(100)), &rec, &ctx).unwrap(), Some(dec!(375)));
        assert_eq!(converted_balance(None, &rec, &ctx).unwrap(), None);
    }

    #[test]
    fn test_real_payment_type_override() {
        let ctx = ctx().with_overdue_codes(["A", "B", "C"]);
        assert_eq!(
            real_payment_type(&record("A", PaymentType::PartialPayment), &ctx),
            PaymentType::OverdueOverride
        );
        assert_eq!(
            real_payment_type(&record("B", PaymentType::Blank), &ctx),
            PaymentType::OverdueOverride
        );
        assert_eq!(
            real_payment_type(&record("C", PaymentType::FullPayment), &ctx),
            PaymentType::FullPayment
        );
        assert_eq!(
            real_payment_type(&record("Z", PaymentType::PartialPayment), &ctx),
            PaymentType::PartialPayment
        );
    }

    #[test]
    fn test_account_status_boundaries() {
        let cutoff = date(2024, 6, 15);
        // null confirmation date is a reviewed business rule: CURRENT
        assert_eq!(account_status(None, cutoff), AccountStatus::Current);
        assert_eq!(account_status(Some(cutoff), cutoff), AccountStatus::Overdue);
        assert_eq!(
            account_status(Some(date(2024, 6, 16)), cutoff),
            AccountStatus::Current
        );
        assert_eq!(
            account_status(Some(date(2024, 1, 1)), cutoff),
            AccountStatus::Overdue
        );
    }

    #[test]
    fn test_real_status_special_collections() {
        let ctx = ctx().with_special_codes(["A"]);
        let rec = record("A", PaymentType::Blank);
        assert_eq!(
            real_status(AccountStatus::Overdue, &rec, &ctx),
            AccountStatus::SpecialCollections
        );
        assert_eq!(
            real_status(AccountStatus::Current, &rec, &ctx),
            AccountStatus::Current
        );
    }

    #[test]
    fn test_derive_full_record() {
        let ctx = ctx()
            .with_overdue_codes(["A"])
            .with_special_codes(["A"]);
        let mut rec = record("A", PaymentType::PartialPayment);
        rec.currency = Some(Currency::USD);
        let derived = derive(rec, &ctx).unwrap();
        assert_eq!(derived.outstanding_balance, Some(dec!(400)));
        assert_eq!(derived.outstanding_balance_converted, Some(dec!(1500)));
        assert_eq!(derived.real_payment_type, PaymentType::OverdueOverride);
        assert_eq!(derived.account_status, AccountStatus::Overdue);
        assert_eq!(derived.real_status, AccountStatus::SpecialCollections);
        // input payment type is left as it was
        assert_eq!(derived.record.payment_type, PaymentType::PartialPayment);
    }

    #[test]
    fn test_derived_columns_serialize_with_labels() {
        let derived = derive(record("A", PaymentType::Blank), &ctx()).unwrap();
        let json = serde_json::to_value(&derived).unwrap();
        assert_eq!(json["estado_cuenta"], "OVERDUE");
        assert_eq!(json["tipo_pago_real"], "");
        assert_eq!(json["codigo_liquidacion"], "A");
        assert_eq!(json["saldo_pendiente"], "1000");
    }

    #[test]
    fn test_overflowing_balance_is_an_error() {
        let mut rec = record("A", PaymentType::Blank);
        rec.currency = Some(Currency::USD);
        rec.confirmed_amount = dec!(70000000000000000000000000000);
        let err = derive(rec, &ctx()).unwrap_err();
        assert!(matches!(
            err,
            FactoringError::ArithmeticOverflow { ref context } if context == "saldo_pendiente_convertido"
        ));

        let mut full = record("B", PaymentType::FullPayment);
        full.confirmed_amount = dec!(70000000000000000000000000000);
        full.amount_paid = Some(dec!(-70000000000000000000000000000));
        assert!(outstanding_balance(&full).is_err());
    }

    #[test]
    fn test_columns_end_with_derived_fields() {
        let columns = DerivedReceivable::columns();
        assert_eq!(columns.first(), Some(&"codigo_liquidacion"));
        assert_eq!(&columns[columns.len() - 5..], &DERIVED_COLUMNS[..]);
    }
}
