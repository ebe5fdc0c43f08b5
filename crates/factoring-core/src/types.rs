use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and exchange rates as plain decimals.
pub type Rate = Decimal;

/// Currency code of a settlement or quote.
///
/// Only soles and dollars are traded; anything else is carried through
/// as `Other` with its upper-cased code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    PEN,
    USD,
    Other(String),
}

impl Currency {
    /// Parse a currency label as it appears in spreadsheets and endpoints.
    pub fn parse(label: &str) -> Self {
        let code = label.trim().to_uppercase();
        match code.as_str() {
            "PEN" | "S/" | "S/." | "SOLES" | "SOL" => Currency::PEN,
            "USD" | "US$" | "$" | "DOLARES" | "DÓLARES" => Currency::USD,
            _ => Currency::Other(code),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Currency::PEN => "PEN",
            Currency::USD => "USD",
            Currency::Other(code) => code,
        }
    }

    /// Display symbol used in quote projections.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::PEN => "S/",
            Currency::USD => "US$",
            Currency::Other(_) => "¤",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for Currency {
    fn from(value: String) -> Self {
        Currency::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
