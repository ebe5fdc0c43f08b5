//! Engine-wide settings. Every field has a default so partial config files
//! are accepted.

use serde::{Deserialize, Serialize};

use crate::ingest::ValidationMode;
#[cfg(feature = "quote")]
use crate::quote::QuoteConfig;
use crate::types::Currency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Currency balances are converted into.
    pub local_currency: Currency,
    pub receivables_mode: ValidationMode,
    pub cash_position_mode: ValidationMode,
    #[cfg(feature = "quote")]
    pub quote: QuoteConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            local_currency: Currency::PEN,
            receivables_mode: ValidationMode::Strict,
            cash_position_mode: ValidationMode::Lenient,
            #[cfg(feature = "quote")]
            quote: QuoteConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"receivables_mode": "lenient"}"#).unwrap();
        assert_eq!(config.receivables_mode, ValidationMode::Lenient);
        assert_eq!(config.cash_position_mode, ValidationMode::Lenient);
        assert_eq!(config.local_currency, Currency::PEN);
    }

    #[cfg(feature = "quote")]
    #[test]
    fn test_quote_section_overrides() {
        use rust_decimal_macros::dec;
        let config: EngineConfig =
            serde_json::from_str(r#"{"quote": {"commission": "7.25"}}"#).unwrap();
        assert_eq!(config.quote.commission, dec!(7.25));
        assert_eq!(config.quote.monthly_rate_pct, dec!(2.0));
    }
}
