use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{ordered_headers, CommandOutput};

/// Render the envelope as tables: records (for batches) or field/value pairs,
/// followed by rejected rows, warnings and methodology.
pub fn print_table(output: &CommandOutput) {
    let Some(envelope) = output.value.as_object() else {
        println!("{}", output.value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) if result.contains_key("records") => {
            print_batch(result, &output.columns);
        }
        Some(result @ Value::Object(_)) => println!("{}", field_value_table(result)),
        _ => println!("{}", field_value_table(&output.value)),
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_batch(result: &Map<String, Value>, columns: &[&str]) {
    match result.get("records") {
        Some(Value::Array(records)) if !records.is_empty() => {
            println!("{}", records_table(records, columns));
        }
        _ => println!("(no records)"),
    }

    if let Some(stats) = result.get("stats") {
        println!("\n{}", field_value_table(stats));
    }

    if let Some(Value::Array(errors)) = result.get("errors") {
        if !errors.is_empty() {
            println!("\nRejected rows:");
            println!("{}", records_table(errors, &["index", "fields", "message"]));
        }
    }

    if let Some(Value::String(err)) = result.get("source_error") {
        println!("\nDataset unavailable: {}", err);
    }
}

fn records_table(rows: &[Value], columns: &[&str]) -> Table {
    let headers = match rows.first() {
        Some(Value::Object(first)) => ordered_headers(first, columns),
        _ => Vec::new(),
    };

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for row in rows {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(cell).unwrap_or_default()),
        );
    }
    builder.build()
}

fn field_value_table(value: &Value) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    if let Value::Object(map) = value {
        for (key, val) in map {
            builder.push_record([key.clone(), cell(val)]);
        }
    }
    builder.build()
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_table_uses_column_order() {
        let rows = vec![json!({"saldo": "10", "codigo_operacion": "OP-1", "estado": null})];
        let rendered = records_table(&rows, &["codigo_operacion", "saldo"]).to_string();
        let header = rendered.lines().nth(1).unwrap();
        let code = header.find("codigo_operacion").unwrap();
        let balance = header.find("saldo").unwrap();
        let status = header.find("estado").unwrap();
        assert!(code < balance && balance < status);
    }

    #[test]
    fn test_cell_flattens_lists_and_nulls() {
        assert_eq!(cell(&json!(["a", "b"])), "a, b");
        assert_eq!(cell(&Value::Null), "");
        assert_eq!(cell(&json!(3)), "3");
    }
}
