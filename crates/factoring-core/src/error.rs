use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed validation, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FactoringError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation failed: {}", describe_issues(.issues))]
    Validation { issues: Vec<FieldIssue> },

    #[error("Invalid date range: due date {due_date} leaves no credit days after {as_of}")]
    InvalidDateRange { as_of: NaiveDate, due_date: NaiveDate },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FactoringError {
    /// Names of the offending fields, empty for non-validation errors.
    pub fn fields(&self) -> Vec<String> {
        match self {
            FactoringError::Validation { issues } => {
                issues.iter().map(|i| i.field.clone()).collect()
            }
            FactoringError::InvalidInput { field, .. } => vec![field.clone()],
            _ => Vec::new(),
        }
    }
}

impl From<serde_json::Error> for FactoringError {
    fn from(e: serde_json::Error) -> Self {
        FactoringError::SerializationError(e.to_string())
    }
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({})", i.field, i.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
