//! Command-line argument definitions for batch-ingest
//!
//! Defines the CLI interface using the clap derive API. `train` and
//! `predict` share one argument set and differ only in the stage they run.

use crate::Result;
use crate::config::{PipelineConfig, Stage, TablePolicy};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the batch ingestion pipeline
///
/// Validates incoming CSV batches against a schema document, loads the
/// accepted rows into SQLite and exports the table as a single CSV file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "batch-ingest",
    version,
    about = "Validate CSV batches against a schema and ingest them into SQLite",
    long_about = "Validates every file of a CSV batch by name against a JSON schema document, \
                  stages it as good or bad, loads the good files row by row into a SQLite table, \
                  archives rejected files and exports the table as one CSV file for downstream use."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the training stage on a batch directory
    Train(StageArgs),
    /// Run the prediction stage on a batch directory
    Predict(StageArgs),
    /// Validate a schema document and print what it describes
    Schema(SchemaArgs),
    /// Load an exported CSV file and print a column summary
    Inspect(InspectArgs),
}

/// Console verbosity shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct Verbosity {
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Verbosity {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Arguments for `train` and `predict`
#[derive(Debug, Clone, ClapArgs)]
pub struct StageArgs {
    /// Directory holding the incoming batch files
    #[arg(value_name = "BATCH_DIR")]
    pub batch_dir: PathBuf,

    /// Directory the stage directories are created under
    ///
    /// Defaults to the current directory or the config file's root.
    #[arg(short = 'r', long = "root", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Schema document to validate against
    ///
    /// Defaults to schema_training.json or schema_prediction.json under the root.
    #[arg(short = 's', long = "schema", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Table receiving accepted rows
    #[arg(long = "table-name", value_name = "NAME")]
    pub table_name: Option<String>,

    /// What to do when the table already exists
    #[arg(long = "table-policy", value_enum, value_name = "POLICY")]
    pub table_policy: Option<TablePolicy>,

    /// Delete the Good staging directory once its files are loaded
    #[arg(long = "purge-good")]
    pub purge_good: bool,

    /// Show a progress bar while classifying files
    #[arg(long = "progress")]
    pub progress: bool,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

impl StageArgs {
    /// Resolve the run configuration: config file first, then flags
    pub fn build_config(&self, stage: Stage) -> Result<PipelineConfig> {
        let mut config = match &self.config_file {
            Some(path) => PipelineConfig::from_file(path)?.with_stage(stage),
            None => PipelineConfig::for_stage(stage),
        };

        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        if let Some(schema) = &self.schema {
            config = config.with_schema_path(schema);
        }
        if let Some(table_name) = &self.table_name {
            config = config.with_table_name(table_name);
        }
        if let Some(policy) = self.table_policy {
            config = config.with_table_policy(policy);
        }
        if self.purge_good {
            config = config.with_purge_good();
        }
        if self.progress && !self.verbosity.quiet {
            config = config.with_progress();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for `schema`
#[derive(Debug, Clone, ClapArgs)]
pub struct SchemaArgs {
    /// Schema document to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

/// Arguments for `inspect`
#[derive(Debug, Clone, ClapArgs)]
pub struct InspectArgs {
    /// Exported CSV file to load
    #[arg(value_name = "CSV")]
    pub file: PathBuf,

    /// Check the header against this schema document
    #[arg(short = 's', long = "schema", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity,
}
