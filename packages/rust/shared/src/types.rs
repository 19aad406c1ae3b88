//! Core document types exchanged between the extractor and the payload builder.

use serde::{Deserialize, Serialize};

/// File name of the intermediate document written by `extract`.
pub const FRAGMENTS_FILE_NAME: &str = "fragments.json";

/// File name of the final document written by `build-payload`.
pub const PAYLOAD_FILE_NAME: &str = "prompt_payload.json";

// ---------------------------------------------------------------------------
// FileRecord
// ---------------------------------------------------------------------------

/// A single captured file: its repository-relative path and a leading excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// The first characters of the file's (lossily decoded) text.
    pub excerpt: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            excerpt: excerpt.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FragmentsDocument
// ---------------------------------------------------------------------------

/// The `fragments.json` structure written at the repository root.
///
/// Every top-level field defaults when absent so hand-edited documents still
/// load; individual records must carry both `path` and `excerpt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentsDocument {
    /// Free-form repository summary. The extractor leaves it empty.
    #[serde(default)]
    pub repo_summary: String,
    /// Captured files in walk order.
    #[serde(default)]
    pub files_scanned: Vec<FileRecord>,
    /// Deployment environment label.
    #[serde(default)]
    pub env: String,
    /// Optional focus hint for the downstream summarizer.
    #[serde(default)]
    pub focus: String,
}

// ---------------------------------------------------------------------------
// PayloadDocument
// ---------------------------------------------------------------------------

/// The `prompt_payload.json` structure handed to the summarization step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadDocument {
    /// Repository summary, never empty.
    pub repo_summary: String,
    /// Priority-ordered, size-bounded subset of the fragments.
    pub files_scanned: Vec<FileRecord>,
    /// Deployment environment label, stored verbatim.
    pub env: String,
    /// Focus hint; empty in the default flow.
    pub focus: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_document_field_order() {
        let doc = FragmentsDocument {
            repo_summary: String::new(),
            files_scanned: vec![FileRecord::new("pom.xml", "<project/>")],
            env: "local".into(),
            focus: String::new(),
        };

        let json = serde_json::to_string(&doc).expect("serialize");
        assert_eq!(
            json,
            r#"{"repo_summary":"","files_scanned":[{"path":"pom.xml","excerpt":"<project/>"}],"env":"local","focus":""}"#
        );
    }

    #[test]
    fn fragments_document_missing_top_level_fields_default() {
        let doc: FragmentsDocument = serde_json::from_str("{}").expect("deserialize");
        assert!(doc.repo_summary.is_empty());
        assert!(doc.files_scanned.is_empty());
    }

    #[test]
    fn file_record_requires_path() {
        let result = serde_json::from_str::<FragmentsDocument>(
            r#"{"files_scanned":[{"excerpt":"x"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_ascii_is_not_escaped() {
        let record = FileRecord::new("README.md", "Configuración ñandú");
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("Configuración ñandú"));
    }

    #[test]
    fn fragments_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/fragments.fixture.json")
            .expect("read fixture");
        let parsed: FragmentsDocument =
            serde_json::from_str(&fixture).expect("deserialize fixture fragments");
        assert_eq!(parsed.files_scanned.len(), 5);
        assert_eq!(parsed.files_scanned[0].path, "pom.xml");
        assert_eq!(parsed.env, "local");
        assert!(parsed.repo_summary.is_empty());
    }
}
