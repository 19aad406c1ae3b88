//! Payload building: `fragments.json` → `prompt_payload.json`.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use repofrag_shared::{
    FRAGMENTS_FILE_NAME, FileRecord, FragmentsDocument, PAYLOAD_FILE_NAME, PayloadConfig,
    PayloadDocument, RepofragError, Result,
};

use crate::document::{read_fragments, write_json};

/// Path fragment identifying configuration-properties files.
const PROPERTIES_MARKER: &str = "/application";

/// Prefix of the conventional source root.
const SOURCE_PREFIX: &str = "src/";

/// Result of a payload build.
#[derive(Debug)]
pub struct PayloadResult {
    /// Where the payload document was written.
    pub output_path: PathBuf,
    /// The document that was written.
    pub document: PayloadDocument,
}

/// Read `<root>/fragments.json`, select fragments and write
/// `<root>/prompt_payload.json`.
///
/// Fails with [`RepofragError::MissingInput`] before writing anything when
/// the fragments document does not exist.
#[instrument(skip_all, fields(root = %config.root.display(), max = config.max, env = %config.env))]
pub fn build_payload(config: &PayloadConfig) -> Result<PayloadResult> {
    if config.max == 0 {
        return Err(RepofragError::validation("max must be a positive integer"));
    }

    let input_path = config.root.join(FRAGMENTS_FILE_NAME);
    let fragments = read_fragments(&input_path)?;

    let document = assemble_payload(&fragments, config);

    let output_path = config.root.join(PAYLOAD_FILE_NAME);
    write_json(&output_path, &document)?;

    info!(
        selected = document.files_scanned.len(),
        available = fragments.files_scanned.len(),
        "payload written"
    );

    Ok(PayloadResult {
        output_path,
        document,
    })
}

/// Build the payload document from an in-memory fragments document.
pub fn assemble_payload(fragments: &FragmentsDocument, config: &PayloadConfig) -> PayloadDocument {
    let repo_summary = if fragments.repo_summary.is_empty() {
        config.fallback_summary.clone()
    } else {
        fragments.repo_summary.clone()
    };

    PayloadDocument {
        repo_summary,
        files_scanned: select_records(&fragments.files_scanned, &config.priority_files, config.max),
        env: config.env.clone(),
        focus: String::new(),
    }
}

/// Select at most `max` records in priority order.
///
/// 1. For each priority file name in order, the first record whose path ends with it
/// 2. Every record whose path contains `/application`
/// 3. Records under `src/`, stopping once `max` records are selected
///
/// Tiers 1 and 2 are not bounded by `max`; the final truncation is.
pub fn select_records(records: &[FileRecord], priority_files: &[String], max: usize) -> Vec<FileRecord> {
    let mut selection = Selection::default();

    // Tier 1: build and container descriptors
    for name in priority_files {
        if let Some(record) = records
            .iter()
            .find(|r| r.path.ends_with(name.as_str()) && !selection.contains(&r.path))
        {
            selection.push(record);
        }
    }

    // Tier 2: configuration properties
    for record in records.iter().filter(|r| r.path.contains(PROPERTIES_MARKER)) {
        selection.push(record);
    }

    // Tier 3: source tree
    for record in records.iter().filter(|r| r.path.starts_with(SOURCE_PREFIX)) {
        if selection.push(record) && selection.len() >= max {
            break;
        }
    }

    let mut selected = selection.records;
    if selected.len() > max {
        debug!(dropped = selected.len() - max, "truncating selection");
        selected.truncate(max);
    }
    selected
}

/// Ordered selection with path deduplication.
#[derive(Default)]
struct Selection {
    seen: HashSet<String>,
    records: Vec<FileRecord>,
}

impl Selection {
    fn contains(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    /// Add `record` unless its path is already selected. Returns whether it was added.
    fn push(&mut self, record: &FileRecord) -> bool {
        if !self.seen.insert(record.path.clone()) {
            return false;
        }
        self.records.push(record.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repofrag_shared::DEFAULT_FALLBACK_SUMMARY;

    fn records(paths: &[&str]) -> Vec<FileRecord> {
        paths
            .iter()
            .map(|p| FileRecord::new(*p, format!("excerpt of {p}")))
            .collect()
    }

    fn priority() -> Vec<String> {
        PayloadConfig::for_root(".").priority_files
    }

    fn selected_paths(selected: &[FileRecord]) -> Vec<&str> {
        selected.iter().map(|r| r.path.as_str()).collect()
    }

    fn fragments(paths: &[&str]) -> FragmentsDocument {
        FragmentsDocument {
            repo_summary: String::new(),
            files_scanned: records(paths),
            env: "local".into(),
            focus: String::new(),
        }
    }

    #[test]
    fn priority_tiers_exhaust_before_truncation() {
        let input = records(&["pom.xml", "Dockerfile", "src/main/App.java", "src/test/AppTest.java"]);

        let selected = select_records(&input, &priority(), 3);

        assert_eq!(
            selected_paths(&selected),
            vec!["pom.xml", "Dockerfile", "src/main/App.java"]
        );
    }

    #[test]
    fn tier_order_overrides_input_order() {
        let input = records(&[
            "src/main/java/App.java",
            "src/main/resources/application.properties",
            "docker-compose.yml",
            "Dockerfile",
            "pom.xml",
        ]);

        let selected = select_records(&input, &priority(), 10);

        assert_eq!(
            selected_paths(&selected),
            vec![
                "pom.xml",
                "Dockerfile",
                "docker-compose.yml",
                "src/main/resources/application.properties",
                "src/main/java/App.java",
            ]
        );
    }

    #[test]
    fn first_match_per_priority_name() {
        let input = records(&["module-a/pom.xml", "pom.xml", "module-b/pom.xml"]);

        let selected = select_records(&input, &priority(), 10);

        assert_eq!(selected_paths(&selected), vec!["module-a/pom.xml"]);
    }

    #[test]
    fn properties_tier_ignores_root_level_files() {
        // Root-level application.properties has no leading slash.
        let input = records(&[
            "application.properties",
            "config/application-prod.properties",
            "docs/application-notes.md",
        ]);

        let selected = select_records(&input, &priority(), 10);

        assert_eq!(
            selected_paths(&selected),
            vec!["config/application-prod.properties", "docs/application-notes.md"]
        );
    }

    #[test]
    fn early_tiers_can_exceed_max_before_truncation() {
        let input = records(&[
            "a/application.properties",
            "b/application.properties",
            "c/application.properties",
            "pom.xml",
            "src/App.java",
        ]);

        let selected = select_records(&input, &priority(), 2);

        assert_eq!(
            selected_paths(&selected),
            vec!["pom.xml", "a/application.properties"]
        );
    }

    #[test]
    fn source_tier_stops_at_max() {
        let input = records(&["src/A.java", "src/B.java", "src/C.java", "src/D.java"]);

        let selected = select_records(&input, &priority(), 2);

        assert_eq!(selected_paths(&selected), vec!["src/A.java", "src/B.java"]);
    }

    #[test]
    fn unmatched_records_are_dropped() {
        let input = records(&["README.md", "docs/guide.md", "lib/Util.java"]);

        let selected = select_records(&input, &priority(), 10);

        assert!(selected.is_empty());
    }

    #[test]
    fn records_are_never_duplicated_across_tiers() {
        // Matches tier 1, tier 2 and tier 3.
        let input = records(&["src/main/resources/application-pom.xml"]);

        let selected = select_records(&input, &priority(), 10);

        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn empty_summary_uses_fallback() {
        let config = PayloadConfig::for_root(".");
        let payload = assemble_payload(&fragments(&["pom.xml"]), &config);

        assert_eq!(payload.repo_summary, DEFAULT_FALLBACK_SUMMARY);
        assert_eq!(payload.repo_summary, "Backend Spring Boot + PostgreSQL (inferred)");
    }

    #[test]
    fn existing_summary_is_kept() {
        let config = PayloadConfig::for_root(".");
        let mut doc = fragments(&["pom.xml"]);
        doc.repo_summary = "Inventory service".into();

        let payload = assemble_payload(&doc, &config);
        assert_eq!(payload.repo_summary, "Inventory service");
    }

    #[test]
    fn env_is_stored_verbatim_and_focus_empty() {
        let mut config = PayloadConfig::for_root(".");
        config.env = "Prod EU-West".into();
        let mut doc = fragments(&["pom.xml"]);
        doc.focus = "security".into();

        let payload = assemble_payload(&doc, &config);
        assert_eq!(payload.env, "Prod EU-West");
        assert!(payload.focus.is_empty());
    }

    #[test]
    fn build_payload_requires_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let config = PayloadConfig::for_root(dir.path());

        let err = build_payload(&config).unwrap_err();

        assert!(err.is_missing_input());
        assert!(!dir.path().join(PAYLOAD_FILE_NAME).exists());
    }

    #[test]
    fn build_payload_rejects_malformed_fragments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(FRAGMENTS_FILE_NAME),
            r#"{"files_scanned":[{"excerpt":"no path"}]}"#,
        )
        .unwrap();
        let config = PayloadConfig::for_root(dir.path());

        let err = build_payload(&config).unwrap_err();

        assert!(matches!(err, RepofragError::Document { .. }));
        assert!(!dir.path().join(PAYLOAD_FILE_NAME).exists());
    }

    #[test]
    fn build_payload_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join(FRAGMENTS_FILE_NAME),
            &fragments(&["pom.xml", "Dockerfile", "src/main/App.java", "src/test/AppTest.java"]),
        )
        .unwrap();
        let mut config = PayloadConfig::for_root(dir.path());
        config.max = 3;
        config.env = "dev".into();

        let result = build_payload(&config).unwrap();

        let written: PayloadDocument =
            serde_json::from_str(&std::fs::read_to_string(&result.output_path).unwrap()).unwrap();
        assert_eq!(written, result.document);
        assert_eq!(
            selected_paths(&written.files_scanned),
            vec!["pom.xml", "Dockerfile", "src/main/App.java"]
        );
        assert_eq!(written.env, "dev");
    }

    #[test]
    fn build_payload_rejects_zero_max() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PayloadConfig::for_root(dir.path());
        config.max = 0;

        assert!(matches!(
            build_payload(&config),
            Err(RepofragError::Validation { .. })
        ));
    }
}
