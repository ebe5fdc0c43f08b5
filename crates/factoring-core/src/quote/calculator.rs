//! Financing quote for a single lead: simple daily interest on the advance
//! plus a fixed operational commission.
//!
//! All arithmetic is in `rust_decimal::Decimal` and every money output is
//! rounded to cents half away from zero (never banker's rounding).

use chrono::{Local, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FactoringError;
use crate::types::{Currency, Money, Rate};
use crate::FactoringResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Commercial month used to turn the monthly rate into a daily one.
const DAYS_IN_MONTH: Decimal = dec!(30);
/// Percent divisor.
const PERCENT: Decimal = dec!(100);
const CENTS: u32 = 2;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Pricing constants. Not part of a quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Monthly interest rate in percent (2.0 = 2 % per month).
    pub monthly_rate_pct: Rate,
    /// Fixed operational commission per quote.
    pub commission: Money,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            monthly_rate_pct: dec!(2.0),
            commission: dec!(5.50),
        }
    }
}

/// One lead's quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    /// Invoice amount to be advanced.
    pub principal: Money,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub currency: Currency,
    /// Quote date; today when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

/// Numeric quote. See [`FinancingQuote::display`] for the formatted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingQuote {
    pub principal: Money,
    pub currency: Currency,
    pub as_of: NaiveDate,
    pub due_date: NaiveDate,
    pub credit_days: i64,
    pub monthly_rate_pct: Rate,
    pub daily_rate: Rate,
    pub interest: Money,
    pub commission: Money,
    /// Principal less interest and commission.
    pub net_amount: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a financing quote.
///
/// Credit days are the whole days from `as_of` to the due date minus one;
/// a due date that leaves no credit days is rejected with
/// [`FactoringError::InvalidDateRange`].
pub fn calculate_financing_quote(
    input: &QuoteInput,
    config: &QuoteConfig,
) -> FactoringResult<FinancingQuote> {
    if input.principal <= Decimal::ZERO {
        return Err(FactoringError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if config.monthly_rate_pct < Decimal::ZERO {
        return Err(FactoringError::InvalidInput {
            field: "monthly_rate_pct".into(),
            reason: "Monthly rate cannot be negative".into(),
        });
    }

    let as_of = input.as_of.unwrap_or_else(|| Local::now().date_naive());
    let credit_days = credit_days(as_of, input.due_date)?;

    let daily_rate = config.monthly_rate_pct / DAYS_IN_MONTH / PERCENT;
    let interest = input
        .principal
        .checked_mul(daily_rate)
        .and_then(|v| v.checked_mul(Decimal::from(credit_days)))
        .map(round_cents)
        .ok_or_else(|| overflow("interest"))?;
    let commission = round_cents(config.commission);
    let net_amount = interest
        .checked_add(commission)
        .and_then(|charges| input.principal.checked_sub(charges))
        .map(round_cents)
        .ok_or_else(|| overflow("net_amount"))?;

    if net_amount <= Decimal::ZERO {
        tracing::warn!(
            principal = %input.principal,
            %interest,
            %commission,
            "quote leaves nothing to disburse"
        );
    }

    Ok(FinancingQuote {
        principal: input.principal,
        currency: input.currency.clone(),
        as_of,
        due_date: input.due_date,
        credit_days,
        monthly_rate_pct: config.monthly_rate_pct,
        daily_rate,
        interest,
        commission,
        net_amount,
    })
}

/// Whole days between the dates, less the one-day settlement adjustment.
pub fn credit_days(as_of: NaiveDate, due_date: NaiveDate) -> FactoringResult<i64> {
    let days = (due_date - as_of).num_days() - 1;
    if days <= 0 {
        return Err(FactoringError::InvalidDateRange { as_of, due_date });
    }
    Ok(days)
}

fn overflow(context: &str) -> FactoringError {
    FactoringError::ArithmeticOverflow {
        context: context.to_string(),
    }
}

/// Round to cents, ties away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero)
}
