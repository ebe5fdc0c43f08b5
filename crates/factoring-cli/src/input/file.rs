use factoring_core::ingest::{record_from_cells, RawRecord};
use factoring_core::EngineConfig;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a dataset: a CSV file with a header row, or a JSON array of row objects.
pub fn read_rows(path: &str) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    if has_extension(&canonical, &["csv"]) {
        return read_csv_rows(&canonical);
    }
    read_json(path)
}

fn read_csv_rows(path: &Path) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;
        rows.push(record_from_cells(&headers, record.iter()));
    }
    Ok(rows)
}

/// Read a set of settlement codes: a JSON array of strings, or one code per line.
pub fn read_code_set(path: &str) -> Result<HashSet<String>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    Ok(parse_code_set(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?)
}

fn parse_code_set(contents: &str) -> Result<HashSet<String>, serde_json::Error> {
    let trimmed = contents.trim();
    if trimmed.starts_with('[') {
        let codes: Vec<String> = serde_json::from_str(trimmed)?;
        return Ok(codes.into_iter().map(|c| c.trim().to_string()).collect());
    }
    Ok(trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Load engine settings from JSON or YAML, chosen by extension.
pub fn read_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    let config: EngineConfig = if has_extension(&canonical, &["yaml", "yml"]) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    tracing::debug!(path = %canonical.display(), "config loaded");
    Ok(config)
}

fn read_contents(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Resolve and validate the path, preventing directory traversal.
pub fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    // Basic existence check
    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_set_from_lines() {
        let codes = parse_code_set("LIQ-001\n\n  LIQ-002  \r\nLIQ-001\n").unwrap();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains("LIQ-002"));
    }

    #[test]
    fn test_code_set_from_json_array() {
        let codes = parse_code_set(r#"["LIQ-010", " LIQ-011"]"#).unwrap();
        assert!(codes.contains("LIQ-010"));
        assert!(codes.contains("LIQ-011"));
    }

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension(Path::new("rows.CSV"), &["csv"]));
        assert!(has_extension(Path::new("engine.yml"), &["yaml", "yml"]));
        assert!(!has_extension(Path::new("rows"), &["csv"]));
    }
}
