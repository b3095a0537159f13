//! Schema document loading and filename pattern derivation.
//!
//! A schema document is a JSON object declaring the expected batch file
//! name, the lengths of its date and time segments, and the ordered list of
//! columns with their SQL storage types:
//!
//! ```json
//! {
//!   "SampleFileName": "phising_08012020_120000.csv",
//!   "LengthOfDateStampInFile": 8,
//!   "LengthOfTimeStampInFile": 6,
//!   "ColName": { "having_IP_Address": "Integer", "Result": "Integer" },
//!   "NumberofColumns": 2
//! }
//! ```
//!
//! `ColName` order is significant: it fixes the table's column order and
//! therefore the export's.

use crate::constants::schema_keys;
use crate::error::{PipelineError, Result};
use crate::logging::{LogChannel, RunLog};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// One declared column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    /// Storage type carried verbatim into `CREATE TABLE`
    pub sql_type: String,
}

/// Validated schema for one stage
#[derive(Debug, Clone)]
pub struct Schema {
    sample_file_name: String,
    date_stamp_length: usize,
    time_stamp_length: usize,
    columns: Vec<ColumnSpec>,
    filename_pattern: Regex,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(rename = "SampleFileName")]
    sample_file_name: String,
    #[serde(rename = "LengthOfDateStampInFile")]
    date_stamp_length: usize,
    #[serde(rename = "LengthOfTimeStampInFile")]
    time_stamp_length: usize,
    #[serde(rename = "ColName")]
    column_names: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "NumberofColumns")]
    column_count: usize,
}

impl Schema {
    /// Parse and validate a schema document; `source` names it in errors
    pub fn from_json(content: &str, source: &Path) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| PipelineError::schema(source, format!("malformed JSON: {}", e)))?;

        // Report every missing key, not just the first
        let missing: Vec<&str> = schema_keys::REQUIRED
            .iter()
            .copied()
            .filter(|key| value.get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::schema(
                source,
                format!("missing required keys: {}", missing.join(", ")),
            ));
        }

        let raw: RawSchema = serde_json::from_value(value)
            .map_err(|e| PipelineError::schema(source, e.to_string()))?;

        let mut columns = Vec::with_capacity(raw.column_names.len());
        for (name, sql_type) in raw.column_names {
            let sql_type = sql_type.as_str().ok_or_else(|| {
                PipelineError::schema(
                    source,
                    format!("{} entry '{}' must map to a type name", schema_keys::COLUMN_NAMES, name),
                )
            })?;
            columns.push(ColumnSpec {
                name,
                sql_type: sql_type.to_string(),
            });
        }

        if columns.is_empty() {
            return Err(PipelineError::schema(
                source,
                format!("{} declares no columns", schema_keys::COLUMN_NAMES),
            ));
        }

        if raw.column_count != columns.len() {
            return Err(PipelineError::schema(
                source,
                format!(
                    "{} is {} but {} declares {} columns",
                    schema_keys::COLUMN_COUNT,
                    raw.column_count,
                    schema_keys::COLUMN_NAMES,
                    columns.len()
                ),
            ));
        }

        let filename_pattern = filename_regex(&raw.sample_file_name)
            .map_err(|reason| PipelineError::schema(source, reason))?;

        Ok(Self {
            sample_file_name: raw.sample_file_name,
            date_stamp_length: raw.date_stamp_length,
            time_stamp_length: raw.time_stamp_length,
            columns,
            filename_pattern,
        })
    }

    pub fn sample_file_name(&self) -> &str {
        &self.sample_file_name
    }

    pub fn date_stamp_length(&self) -> usize {
        self.date_stamp_length
    }

    pub fn time_stamp_length(&self) -> usize {
        self.time_stamp_length
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Pattern every accepted batch file name must match
    pub fn filename_pattern(&self) -> &Regex {
        &self.filename_pattern
    }

    /// Copy of this schema with different timestamp lengths
    #[cfg(test)]
    pub fn with_stamp_lengths(mut self, date_stamp_length: usize, time_stamp_length: usize) -> Self {
        self.date_stamp_length = date_stamp_length;
        self.time_stamp_length = time_stamp_length;
        self
    }
}

/// Build `^<prefix>_(\d+)_(\d+)\.csv$` from a sample file name
///
/// The prefix is the part of the sample name before its first underscore
/// and must be alphabetic.
pub fn filename_regex(sample_file_name: &str) -> std::result::Result<Regex, String> {
    let prefix = sample_file_name
        .split_once('_')
        .map(|(prefix, _)| prefix)
        .unwrap_or("");

    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "{} '{}' must start with an alphabetic prefix followed by '_'",
            schema_keys::SAMPLE_FILE_NAME,
            sample_file_name
        ));
    }

    let pattern = format!(r"^{}_(\d+)_(\d+)\.csv$", regex::escape(prefix));
    Regex::new(&pattern).map_err(|e| format!("cannot build filename pattern: {}", e))
}

/// Load the schema document at `path`, recording its numeric fields
pub fn load_schema(path: &Path, log: &RunLog) -> Result<Schema> {
    debug!("Loading schema from {}", path.display());

    let result = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::schema(path, format!("cannot read schema document: {}", e)))
        .and_then(|content| Schema::from_json(&content, path));

    match result {
        Ok(schema) => {
            log.info(
                LogChannel::Schema,
                format!(
                    "LengthOfDateStampInFile:: {}\tLengthOfTimeStampInFile:: {}\tNumberofColumns:: {}",
                    schema.date_stamp_length(),
                    schema.time_stamp_length(),
                    schema.column_count()
                ),
            );
            Ok(schema)
        }
        Err(e) => {
            log.warn(LogChannel::Schema, format!("load_schema: {}", e));
            Err(e)
        }
    }
}
