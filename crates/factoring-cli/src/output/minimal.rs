use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, first in the
/// result object and then in its batch statistics, then falls back to the
/// first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

const PRIORITY_KEYS: [&str; 5] = [
    "net_amount",
    "interest",
    "total_balance",
    "record_count",
    "state",
];

fn minimal_line(value: &Value) -> String {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result_obj else {
        return format_minimal(result_obj);
    };

    let stats = map.get("stats").and_then(Value::as_object);
    for key in PRIORITY_KEYS {
        let found = map.get(key).or_else(|| stats.and_then(|s| s.get(key)));
        if let Some(val) = found.filter(|v| !v.is_null()) {
            return format_minimal(val);
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
        None => format_minimal(result_obj),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_prints_net_amount() {
        let out = json!({"result": {"principal": "10000.00", "net_amount": "9627.83"}});
        assert_eq!(minimal_line(&out), "9627.83");
    }

    #[test]
    fn test_batch_prints_total_balance_from_stats() {
        let out = json!({"result": {"records": [], "stats": {"record_count": 0, "total_balance": "0"}}});
        assert_eq!(minimal_line(&out), "0");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        assert_eq!(minimal_line(&json!({"result": {"alpha": 1}})), "alpha: 1");
    }
}
