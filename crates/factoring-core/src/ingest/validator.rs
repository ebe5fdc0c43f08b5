//! Assembles coerced fields into a validated row, applying the presence and
//! fallback rules of the active [`ValidationMode`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coercion::{self, CoercionFailure};
use super::raw::{RawRecord, RawValue};
use super::schema::{FieldKind, FieldSpec, Presence, Schema, ValidationMode};
use crate::error::{FactoringError, FieldIssue};
use crate::FactoringResult;

/// Integer field that kept its source text because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LenientInt {
    Value(i64),
    Unparsed(String),
}

impl LenientInt {
    pub fn value(&self) -> Option<i64> {
        match self {
            LenientInt::Value(v) => Some(*v),
            LenientInt::Unparsed(_) => None,
        }
    }
}

/// A coerced cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Money(Decimal),
    Integer(LenientInt),
    Date(NaiveDate),
    Boolean(bool),
}

static NULL: FieldValue = FieldValue::Null;

/// Coerced values, position-aligned with the schema that produced them.
#[derive(Debug, Clone)]
pub struct ValidatedRow<'s> {
    schema: &'s Schema,
    values: Vec<FieldValue>,
}

impl<'s> ValidatedRow<'s> {
    fn get(&self, name: &str) -> &FieldValue {
        self.schema
            .fields()
            .iter()
            .position(|f| f.name == name)
            .map(|i| &self.values[i])
            .unwrap_or(&NULL)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name) {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Text of a field the validator already guaranteed to be present.
    pub fn required_text(&self, name: &str) -> FactoringResult<String> {
        self.text(name).ok_or_else(|| FactoringError::Validation {
            issues: vec![FieldIssue::new(name, "required field is missing")],
        })
    }

    pub fn money(&self, name: &str) -> Option<Decimal> {
        match self.get(name) {
            FieldValue::Money(m) => Some(*m),
            _ => None,
        }
    }

    pub fn required_money(&self, name: &str) -> FactoringResult<Decimal> {
        self.money(name).ok_or_else(|| FactoringError::Validation {
            issues: vec![FieldIssue::new(name, "required field is missing")],
        })
    }

    pub fn integer(&self, name: &str) -> Option<LenientInt> {
        match self.get(name) {
            FieldValue::Integer(i) => Some(i.clone()),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Validate one raw record against `schema`.
///
/// Every offending field is reported, not just the first.
pub fn validate<'s>(
    raw: &RawRecord,
    schema: &'s Schema,
    mode: ValidationMode,
) -> FactoringResult<ValidatedRow<'s>> {
    let slots = schema.normalize(raw);
    let mut values = Vec::with_capacity(slots.len());
    let mut issues = Vec::new();

    for (field, slot) in schema.fields().iter().zip(slots) {
        match validate_field(field, slot, mode) {
            Ok(value) => values.push(value),
            Err(issue) => {
                issues.push(issue);
                values.push(FieldValue::Null);
            }
        }
    }

    if issues.is_empty() {
        Ok(ValidatedRow { schema, values })
    } else {
        Err(FactoringError::Validation { issues })
    }
}

fn validate_field(
    field: &FieldSpec,
    slot: Option<&RawValue>,
    mode: ValidationMode,
) -> Result<FieldValue, FieldIssue> {
    let raw = match slot {
        Some(RawValue::Null) | None => return absent(field),
        Some(raw) => raw,
    };

    let coerced = match field.kind {
        FieldKind::Text => coercion::coerce_text(raw).map(|v| v.map(FieldValue::Text)),
        FieldKind::TaxId => coercion::coerce_tax_id(raw).map(|v| v.map(FieldValue::Text)),
        FieldKind::Money => coercion::coerce_money(raw).map(|v| v.map(FieldValue::Money)),
        FieldKind::NullableInteger => coercion::coerce_integer(raw)
            .map(|v| v.map(|i| FieldValue::Integer(LenientInt::Value(i)))),
        FieldKind::Date => coercion::coerce_date(raw).map(|v| v.map(FieldValue::Date)),
        FieldKind::Boolean => coercion::coerce_bool(raw).map(|v| v.map(FieldValue::Boolean)),
    };

    match coerced {
        Ok(Some(value)) => Ok(value),
        Ok(None) => blank(field, raw, mode),
        Err(failure) => unparseable(field, failure, mode),
    }
}

/// Column missing or explicitly null.
fn absent(field: &FieldSpec) -> Result<FieldValue, FieldIssue> {
    match field.presence {
        Presence::Required => Err(FieldIssue::new(field.name, "required field is missing")),
        Presence::Optional => Ok(FieldValue::Null),
        Presence::ZeroDefault => Ok(FieldValue::Money(Decimal::ZERO)),
    }
}

/// Present but blank (empty text, NaN, `-` for money).
fn blank(field: &FieldSpec, raw: &RawValue, mode: ValidationMode) -> Result<FieldValue, FieldIssue> {
    match (field.presence, mode) {
        (Presence::Required, ValidationMode::Lenient) if field.kind == FieldKind::Text => {
            // legacy codes may be blank but are never dropped
            Ok(FieldValue::Text(String::new()))
        }
        (Presence::Required, _) if matches!(raw, RawValue::Text(_)) => {
            Err(FieldIssue::new(field.name, "required field is blank"))
        }
        _ => absent(field),
    }
}

fn unparseable(
    field: &FieldSpec,
    failure: CoercionFailure,
    mode: ValidationMode,
) -> Result<FieldValue, FieldIssue> {
    if mode == ValidationMode::Strict || field.presence == Presence::Required {
        return Err(FieldIssue::new(field.name, failure.reason));
    }

    let fallback = match (field.kind, field.presence) {
        (FieldKind::NullableInteger, _) => {
            FieldValue::Integer(LenientInt::Unparsed(failure.original.clone()))
        }
        (FieldKind::Money, Presence::ZeroDefault) => FieldValue::Money(Decimal::ZERO),
        _ => FieldValue::Null,
    };
    tracing::debug!(
        field = field.name,
        reason = %failure.reason,
        fallback = ?fallback,
        "coercion fallback"
    );
    Ok(fallback)
}
