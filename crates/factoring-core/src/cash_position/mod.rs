//! Cash-position ("saldos") records. Column normalisation and coercion only.

pub mod record;

pub use record::CashPositionRecord;
