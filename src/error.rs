//! Error handling for batch validation and ingestion.
//!
//! Each pipeline stage has its own variant so callers can tell a fatal
//! schema or export failure apart from a recoverable row-level insert
//! failure, which the table store handles by quarantining the file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Schema error in {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    #[error("Filename validation failed during {operation}: {source}")]
    Validation {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Archiving bad files failed during {operation}: {source}")]
    Archive {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Insert into {table} failed for file {file} at line {line}: {reason}")]
    Insert {
        file: String,
        table: String,
        line: usize,
        reason: String,
    },

    #[error("Export to {path} failed: {reason}")]
    Export { path: PathBuf, reason: String },

    #[error("Database error during {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("IO error during {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PipelineError {
    /// Create a schema error for the document at `path`
    pub fn schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a filename validation error
    pub fn validation(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Validation {
            operation: operation.into(),
            source,
        }
    }

    /// Create an archive error
    pub fn archive(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Archive {
            operation: operation.into(),
            source,
        }
    }

    /// Create an export error
    pub fn export(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Export {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a database error with the operation that issued the statement
    pub fn database(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            operation: operation.into(),
            source,
        }
    }

    /// Create an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is recovered locally instead of aborting the run
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
