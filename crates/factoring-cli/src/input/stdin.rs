use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise piped JSON from stdin into `T`.
///
/// `Ok(None)` when stdin is a terminal or the pipe is empty, so commands can
/// fall back to their flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse JSON from stdin: {}", e))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use factoring_core::ingest::{RawRecord, RawValue};

    #[test]
    fn test_blank_pipe_is_no_input() {
        let rows: Option<Vec<RawRecord>> = parse_piped("  \n").unwrap();
        assert!(rows.is_none());
    }

    #[test]
    fn test_piped_rows() {
        let rows: Vec<RawRecord> = parse_piped(r#"[{"codigo_operacion": "OP-1", "saldo": 12.5}]"#)
            .unwrap()
            .unwrap();
        assert_eq!(rows[0]["saldo"], RawValue::Float(12.5));
    }

    #[test]
    fn test_malformed_pipe_names_stdin() {
        let err = parse_piped::<Vec<RawRecord>>("[{").unwrap_err();
        assert!(err.to_string().contains("stdin"));
    }
}
