//! JSON document loading and report writing

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a typed document from a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded document");
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write plain text output (Markdown reports)
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use finops_lib::models::ResourceInventory;
    use std::io::Write;

    #[test]
    fn test_load_typed_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"resources": [{{"name": "vm-1", "monthly_cost": 9.5}}]}}"#
        )
        .unwrap();

        let inventory: ResourceInventory = load_json(file.path()).unwrap();
        assert_eq!(inventory.resources.len(), 1);
        assert_eq!(inventory.resources[0].monthly_cost, 9.5);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_json::<ResourceInventory>(Path::new("/nonexistent/inventory.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_malformed_json_has_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_json::<ResourceInventory>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
