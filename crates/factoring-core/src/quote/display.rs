//! Currency-prefixed text projection of a quote, kept apart from the numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::{round_cents, FinancingQuote};
use crate::types::Currency;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDisplay {
    pub currency: String,
    pub principal: String,
    pub interest: String,
    pub commission: String,
    pub net_amount: String,
    pub credit_days: String,
    pub monthly_rate: String,
    pub due_date: String,
}

impl FinancingQuote {
    pub fn display(&self) -> QuoteDisplay {
        QuoteDisplay {
            currency: self.currency.code().to_string(),
            principal: format_amount(self.principal, &self.currency),
            interest: format_amount(self.interest, &self.currency),
            commission: format_amount(self.commission, &self.currency),
            net_amount: format_amount(self.net_amount, &self.currency),
            credit_days: format!("{} días", self.credit_days),
            monthly_rate: format!("{}%", self.monthly_rate_pct.normalize()),
            due_date: self.due_date.format("%d/%m/%Y").to_string(),
        }
    }
}

/// `S/ 10,000.00`, `US$ 1,234.50`, `¤ 99.00`.
pub fn format_amount(value: Decimal, currency: &Currency) -> String {
    let rounded = round_cents(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{} {sign}{grouped}.{cents}", currency.symbol())
}
