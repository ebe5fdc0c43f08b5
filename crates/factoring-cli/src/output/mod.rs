pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// A command's result envelope and the column order its records should be
/// rendered in. JSON objects lose field order, so tabular renderers use
/// `columns` instead.
pub struct CommandOutput {
    pub value: Value,
    pub columns: Vec<&'static str>,
}

impl CommandOutput {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<&'static str>) -> Self {
        self.columns = columns;
        self
    }
}

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, output: &CommandOutput) {
    match format {
        OutputFormat::Json => json::print_json(&output.value),
        OutputFormat::Table => table::print_table(output),
        OutputFormat::Csv => csv_out::print_csv(output),
        OutputFormat::Minimal => minimal::print_minimal(&output.value),
    }
}

/// Row array of a batch result, if the envelope carries one.
pub(crate) fn batch_records(value: &Value) -> Option<&Vec<Value>> {
    value
        .get("result")
        .and_then(|r| r.get("records"))
        .and_then(Value::as_array)
}

/// Known columns in canonical order, then any others the row carries.
pub(crate) fn ordered_headers(first: &Map<String, Value>, columns: &[&str]) -> Vec<String> {
    let mut headers: Vec<String> = columns
        .iter()
        .filter(|c| first.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    headers.extend(
        first
            .keys()
            .filter(|k| !columns.contains(&k.as_str()))
            .cloned(),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headers_follow_canonical_order_then_extras() {
        let row = json!({"saldo": "1", "codigo_operacion": "OP-1", "zeta": 1, "alfa": 2});
        let headers = ordered_headers(row.as_object().unwrap(), &["codigo_operacion", "saldo", "missing"]);
        assert_eq!(headers, vec!["codigo_operacion", "saldo", "alfa", "zeta"]);
    }

    #[test]
    fn test_headers_without_columns_keep_key_order() {
        let row = json!({"b": 1, "a": 2});
        assert_eq!(ordered_headers(row.as_object().unwrap(), &[]), vec!["a", "b"]);
    }
}
