//! Single-lead financing quotes.

pub mod calculator;
pub mod display;

pub use calculator::{calculate_financing_quote, credit_days, FinancingQuote, QuoteConfig, QuoteInput};
pub use display::{format_amount, QuoteDisplay};
