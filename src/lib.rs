//! Batch Ingest Library
//!
//! A Rust library for validating batches of CSV files against a JSON schema
//! document and ingesting the accepted rows into a SQLite table.
//!
//! This library provides tools for:
//! - Loading and checking schema documents
//! - Partitioning a batch into Good and Bad staging by file name
//! - Loading Good files row by row, quarantining files with bad rows
//! - Archiving rejected files under timestamped entries
//! - Exporting the table as a single CSV file and reading it back with polars
//! - Per-run audit logs, one file per concern

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod schema;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{PipelineConfig, Stage, StageLayout, TablePolicy};
pub use error::{PipelineError, Result};
pub use logging::{LogChannel, RunLog};
pub use models::{RunStats, TableOutcome, Verdict};
pub use pipeline::Pipeline;
pub use schema::{Schema, load_schema};
