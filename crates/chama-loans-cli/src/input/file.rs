use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use chama_loans_core::lending::products::LoanCatalog;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read and validate a loan product catalog. `.yaml`/`.yml` files are parsed
/// as YAML, anything else as JSON.
pub fn read_catalog(path: &str) -> Result<LoanCatalog, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let is_yaml = matches!(
        canonical.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let catalog = if is_yaml {
        LoanCatalog::from_yaml_str(&contents)
    } else {
        LoanCatalog::from_json_str(&contents)
    }
    .map_err(|e| format!("Invalid catalog '{}': {}", canonical.display(), e))?;

    tracing::debug!(path = %canonical.display(), loan_types = catalog.loan_types.len(), "catalog loaded");
    Ok(catalog)
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
