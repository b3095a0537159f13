//! Export of the ingestion table to a single CSV file
//!
//! The output has a header of the column names followed by every row, all
//! fields quoted with embedded quotes doubled, CRLF line endings and `\` as
//! the escape character. It is written in the same shape the loader
//! accepts, so an export can be fed back through the pipeline.

use super::table_store::{StoreConnection, read_table};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::logging::{LogChannel, RunLog};
use crate::models::ExportReport;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use rusqlite::types::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Text form of a cell; NULL becomes the empty string
///
/// Reals always carry a decimal point or exponent so whole numbers stay
/// distinguishable from integers downstream.
pub fn value_to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{:?}", f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Writes the table out for downstream consumers
#[derive(Debug)]
pub struct Exporter {
    database_path: PathBuf,
    table_name: String,
    export_path: PathBuf,
    log: Arc<RunLog>,
}

impl Exporter {
    pub fn new(config: &PipelineConfig, log: Arc<RunLog>) -> Self {
        let layout = config.layout();
        Self {
            database_path: layout.database_path,
            table_name: config.table_name.clone(),
            export_path: layout.export_path,
            log,
        }
    }

    /// Default destination for this stage
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Export to the stage's default destination
    pub fn export(&self) -> Result<ExportReport> {
        self.export_to_csv(&self.export_path)
    }

    /// Export every row of the table to `dest`, replacing any existing file
    pub fn export_to_csv(&self, dest: &Path) -> Result<ExportReport> {
        self.write_export(dest).inspect_err(|e| {
            self.log.warn(
                LogChannel::Export,
                format!("File exporting failed. Error: {}", e),
            );
        })
    }

    fn write_export(&self, dest: &Path) -> Result<ExportReport> {
        let snapshot = {
            let conn = StoreConnection::open(&self.database_path, &self.log)
                .map_err(|e| PipelineError::export(dest, format!("opening database: {}", e)))?;
            read_table(&conn, &self.table_name)
                .map_err(|e| PipelineError::export(dest, format!("reading table: {}", e)))?
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PipelineError::export(dest, format!("creating {}: {}", parent.display(), e))
            })?;
        }

        let mut writer = WriterBuilder::new()
            .delimiter(b',')
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Always)
            .double_quote(true)
            .escape(b'\\')
            .from_path(dest)
            .map_err(|e| PipelineError::export(dest, e.to_string()))?;

        writer
            .write_record(&snapshot.columns)
            .map_err(|e| PipelineError::export(dest, e.to_string()))?;
        for row in &snapshot.rows {
            writer
                .write_record(row.iter().map(value_to_field))
                .map_err(|e| PipelineError::export(dest, e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| PipelineError::export(dest, e.to_string()))?;

        self.log.info(
            LogChannel::Export,
            format!(
                "File exported successfully: {} ({} rows)",
                dest.display(),
                snapshot.rows.len()
            ),
        );

        Ok(ExportReport {
            path: dest.to_path_buf(),
            rows: snapshot.rows.len(),
            columns: snapshot.columns,
        })
    }
}
