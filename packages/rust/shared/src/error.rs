//! Error types for La Sfera.
//!
//! Library crates use [`SferaError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all La Sfera operations.
#[derive(Debug, thiserror::Error)]
pub enum SferaError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A source directory is missing or unreadable.
    #[error("filesystem error at {path:?}: {message}")]
    FileSystem { path: PathBuf, message: String },

    /// A source document could not be parsed.
    #[error("parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A record lacks a key required for sorting or keying.
    #[error("record '{record}' in {entity} is missing required field '{field}'")]
    MissingField {
        entity: String,
        record: String,
        field: String,
    },

    /// A required key is present but holds the wrong kind of value.
    #[error("record '{record}' in {entity} has invalid field '{field}': {message}")]
    InvalidField {
        entity: String,
        record: String,
        field: String,
        message: String,
    },

    /// Source data violates a precondition (e.g. line-code shape).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTTP failure or an unsuccessful API response.
    #[error("network error: {0}")]
    Network(String),

    /// Rejected user action (empty annotation, no selection, bad range).
    #[error("{0}")]
    UserInput(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SferaError>;

impl SferaError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a filesystem error for a path.
    pub fn file_system(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::FileSystem {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a parse error for a source document.
    pub fn parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn missing_field(
        entity: impl Into<String>,
        record: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::MissingField {
            entity: entity.into(),
            record: record.into(),
            field: field.into(),
        }
    }

    pub fn invalid_field(
        entity: impl Into<String>,
        record: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            entity: entity.into(),
            record: record.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a user-input error from any displayable message.
    pub fn user_input(msg: impl Into<String>) -> Self {
        Self::UserInput(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SferaError::config("unknown ordering 'random'");
        assert_eq!(err.to_string(), "config error: unknown ordering 'random'");

        let err = SferaError::missing_field("stanzas", "01.01.01", "line_code");
        assert_eq!(
            err.to_string(),
            "record '01.01.01' in stanzas is missing required field 'line_code'"
        );

        let err = SferaError::user_input("Please select some text to annotate");
        assert_eq!(err.to_string(), "Please select some text to annotate");
    }

    #[test]
    fn parse_error_names_file() {
        let err = SferaError::parse("data/stanzas/bad.yaml", "unexpected end of stream");
        assert!(err.to_string().contains("bad.yaml"));
    }
}
