//! Error types for crateprov.
//!
//! Library crates use [`ProvenanceError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all extraction operations.
///
/// `NotFound` and `Validation` are the two hard failures of the extraction
/// pipeline; neither is ever retried.
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// A required crate directory, manifest, entity, or file is absent.
    #[error("{what} not found: {location}")]
    NotFound { what: String, location: String },

    /// A structural invariant of the crate was violated.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A manifest could not be parsed as a JSON-LD graph.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON output could not be produced.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProvenanceError>;

impl ProvenanceError {
    /// Create a not-found error naming what was missing and where.
    pub fn not_found(what: impl Into<String>, location: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: what.into(),
            location: location.to_string(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// Whether this is a missing file/entity/crate error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a structural invariant violation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
