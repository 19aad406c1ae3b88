//! Fragment extraction: repository tree → `fragments.json`.
//!
//! Three capture phases run in order, each skipping paths an earlier phase
//! already recorded:
//! 1. Priority files directly under the root
//! 2. `application*.properties` files at any depth
//! 3. A full walk capturing files by extension or priority name

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, info, instrument, trace};
use walkdir::{DirEntry, WalkDir};

use repofrag_shared::{ExtractConfig, FRAGMENTS_FILE_NAME, FileRecord, FragmentsDocument, Result};

use crate::document::write_json;

/// Environment label the extractor writes into the fragments document.
const DEFAULT_ENV: &str = "local";

/// Result of an extraction run.
#[derive(Debug)]
pub struct ExtractResult {
    /// Where the fragments document was written.
    pub output_path: PathBuf,
    /// The document that was written.
    pub document: FragmentsDocument,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl ExtractResult {
    /// Number of captured files.
    pub fn count(&self) -> usize {
        self.document.files_scanned.len()
    }

    /// The first `n` captured paths, for operator display.
    pub fn preview(&self, n: usize) -> impl Iterator<Item = &str> {
        self.document
            .files_scanned
            .iter()
            .take(n)
            .map(|r| r.path.as_str())
    }
}

/// Progress callback for reporting extraction status.
pub trait ProgressReporter {
    /// Called when entering a new capture phase.
    fn phase(&self, name: &str);
    /// Called after each captured file.
    fn file_captured(&self, path: &str, count: usize);
    /// Called when the document has been written.
    fn done(&self, result: &ExtractResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_captured(&self, _path: &str, _count: usize) {}
    fn done(&self, _result: &ExtractResult) {}
}

/// Scan the tree and write `<root>/fragments.json`.
///
/// Unreadable files are skipped; only a failure to write the document is an
/// error.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub fn extract(config: &ExtractConfig, progress: &dyn ProgressReporter) -> Result<ExtractResult> {
    let start = Instant::now();

    let document = scan(config, progress);

    let output_path = config.root.join(FRAGMENTS_FILE_NAME);
    write_json(&output_path, &document)?;

    let result = ExtractResult {
        output_path,
        document,
        elapsed: start.elapsed(),
    };

    info!(
        files = result.count(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "extraction complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Scan the tree and build the fragments document without writing it.
pub fn scan(config: &ExtractConfig, progress: &dyn ProgressReporter) -> FragmentsDocument {
    let mut collector = Collector::new(config, progress);

    // --- Phase 1: priority files at the root ---
    progress.phase("Checking root build files");
    for name in &config.priority_files {
        let path = config.root.join(name);
        if path.is_file() {
            collector.add_file(&path);
        }
    }

    // --- Phase 2: application*.properties anywhere ---
    progress.phase("Collecting application properties");
    for entry in walk(config) {
        if entry.path().is_file() && is_application_properties(&entry.file_name().to_string_lossy())
        {
            collector.add_file(entry.path());
        }
    }

    // --- Phase 3: full walk ---
    progress.phase("Scanning source tree");
    for entry in walk(config) {
        let name = entry.file_name().to_string_lossy();
        if !matches_capture_rules(config, &name) || !entry.path().is_file() {
            continue;
        }

        // An unknown size is treated as small enough.
        match entry.path().metadata() {
            Ok(meta) if meta.len() > config.max_file_bytes => {
                debug!(path = %entry.path().display(), size = meta.len(), "file too large, skipping");
                continue;
            }
            _ => {}
        }

        collector.add_file(entry.path());
    }

    FragmentsDocument {
        repo_summary: String::new(),
        files_scanned: collector.records,
        env: DEFAULT_ENV.to_string(),
        focus: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Capture rules
// ---------------------------------------------------------------------------

/// `application.properties`, `application-dev.properties`, ...
fn is_application_properties(file_name: &str) -> bool {
    static PROPS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^application.*\.properties$").expect("valid regex"));
    PROPS_RE.is_match(file_name)
}

fn matches_capture_rules(config: &ExtractConfig, file_name: &str) -> bool {
    config.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
        || config.priority_files.iter().any(|name| name == file_name)
}

/// Directories below the root whose name is an excluded segment.
fn is_excluded_dir(config: &ExtractConfig, entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && config
            .excluded_dirs
            .iter()
            .any(|d| entry.file_name().to_string_lossy() == d.as_str())
}

/// Deterministic walk of the root with excluded subtrees pruned.
fn walk<'a>(config: &'a ExtractConfig) -> impl Iterator<Item = DirEntry> + 'a {
    WalkDir::new(&config.root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !is_excluded_dir(config, e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "walk error, skipping entry");
                None
            }
        })
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Accumulates records, enforcing unique paths.
struct Collector<'a> {
    config: &'a ExtractConfig,
    progress: &'a dyn ProgressReporter,
    seen: HashSet<String>,
    records: Vec<FileRecord>,
}

impl<'a> Collector<'a> {
    fn new(config: &'a ExtractConfig, progress: &'a dyn ProgressReporter) -> Self {
        Self {
            config,
            progress,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn add_file(&mut self, path: &Path) {
        let Some(rel) = relative_path(&self.config.root, path) else {
            debug!(path = %path.display(), "path outside root, skipping");
            return;
        };

        if self.seen.contains(&rel) {
            trace!(path = %rel, "already captured");
            return;
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %rel, error = %e, "unreadable file, skipping");
                return;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let excerpt = truncate_chars(&text, self.config.max_chars);

        self.seen.insert(rel.clone());
        self.records.push(FileRecord::new(rel, excerpt));

        if let Some(record) = self.records.last() {
            self.progress.file_captured(&record.path, self.records.len());
        }
    }
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// The first `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
