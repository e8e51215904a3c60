//! JSON output for extraction results.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crateprov_shared::{ProvenanceError, Result};

/// Pretty-print a value as JSON.
pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| ProvenanceError::Serialization(format!("JSON serialization failed: {e}")))
}

/// Write a value as pretty JSON, replacing `path` atomically.
///
/// The document is written to a hidden temp file next to `path` and renamed
/// over it, so readers never observe a partial file.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = to_json(data)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| ProvenanceError::io(dir, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ProvenanceError::validation(format!("not a file path: {}", path.display())))?;
    let temp = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp, format!("{json}\n")).map_err(|e| ProvenanceError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| ProvenanceError::io(path, e))?;

    debug!(path = %path.display(), bytes = json.len(), "wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn write_json_creates_parents_and_leaves_no_temp() {
        let dir = std::env::temp_dir().join(format!("crateprov-output-test-{}", uuid::Uuid::now_v7()));
        let path = dir.join("out/steps.json");

        write_json(&path, &json!({"b": 1, "a": [1, 2]})).unwrap();
        write_json(&path, &json!({"replaced": true})).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"replaced": true}));
        assert!(!dir.join("out/.steps.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn to_json_is_indented() {
        let text = to_json(&json!({"a": 1})).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }
}
