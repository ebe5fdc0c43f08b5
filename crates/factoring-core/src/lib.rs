pub mod batch;
pub mod config;
pub mod error;
pub mod ingest;
pub mod task_status;
pub mod types;

#[cfg(feature = "receivables")]
pub mod receivables;

#[cfg(feature = "cash_position")]
pub mod cash_position;

#[cfg(feature = "quote")]
pub mod quote;

pub use config::EngineConfig;
pub use error::{FactoringError, FieldIssue};
pub use types::*;

/// Standard result type for all factoring operations
pub type FactoringResult<T> = Result<T, FactoringError>;
