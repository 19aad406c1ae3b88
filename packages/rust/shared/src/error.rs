//! Error types for repofrag.
//!
//! Library crates use [`RepofragError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all repofrag operations.
#[derive(Debug, thiserror::Error)]
pub enum RepofragError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or serialized.
    #[error("invalid document {path:?}: {message}")]
    Document { path: PathBuf, message: String },

    /// A required input document does not exist.
    #[error("required input not found: {path:?}")]
    MissingInput { path: PathBuf },

    /// Data validation error (bad argument, invalid value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RepofragError>;

impl RepofragError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a document error for the file at `path`.
    pub fn document(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Document {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error is a missing-precondition failure.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}
