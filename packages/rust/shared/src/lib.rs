//! Shared types, error model, and configuration for repofrag.
//!
//! This crate is the foundation depended on by the other repofrag crates.
//! It provides:
//! - [`RepofragError`] — the unified error type
//! - Document types ([`FileRecord`], [`FragmentsDocument`], [`PayloadDocument`])
//! - Configuration ([`AppConfig`], [`ExtractConfig`], [`PayloadConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_FALLBACK_SUMMARY, ExtractConfig, ExtractSection, PayloadConfig,
    PayloadSection, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
pub use error::{RepofragError, Result};
pub use types::{
    FRAGMENTS_FILE_NAME, FileRecord, FragmentsDocument, PAYLOAD_FILE_NAME, PayloadDocument,
};
