//! Reading and writing the JSON documents at the repository root.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use repofrag_shared::{FragmentsDocument, RepofragError, Result};

/// Write a JSON document (pretty-printed, non-ASCII preserved).
///
/// The content goes to a dot-prefixed temp file first and is renamed into
/// place, so readers never observe a half-written document.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| RepofragError::document(path, format!("JSON serialization failed: {e}")))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.json".to_string());
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| RepofragError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| RepofragError::io(path, e))?;

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Load a fragments document.
///
/// Returns [`RepofragError::MissingInput`] when the file does not exist and
/// [`RepofragError::Document`] when it is not a valid fragments document.
pub fn read_fragments(path: &Path) -> Result<FragmentsDocument> {
    if !path.exists() {
        return Err(RepofragError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| RepofragError::io(path, e))?;
    let document: FragmentsDocument = serde_json::from_str(&content)
        .map_err(|e| RepofragError::document(path, e.to_string()))?;

    debug!(
        path = %path.display(),
        records = document.files_scanned.len(),
        "loaded fragments document"
    );
    Ok(document)
}
