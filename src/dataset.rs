//! Loading the exported table for downstream use.
//!
//! The export is the hand-off point to whatever consumes the ingested data.
//! This module reads it back into a polars [`DataFrame`] and, when a schema
//! is supplied, checks that the header matches the schema's column order.

use crate::error::{PipelineError, Result};
use crate::schema::Schema;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Read an exported CSV file into a DataFrame
pub fn load_export(path: &Path, schema: Option<&Schema>) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::export(path, "export file not found"));
    }

    debug!("Loading export from {}", path.display());
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .collect()?;

    if let Some(schema) = schema {
        let found: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        let expected: Vec<&str> = schema.column_names().collect();
        if found != expected {
            return Err(PipelineError::export(
                path,
                format!(
                    "header does not match schema: expected [{}], found [{}]",
                    expected.join(", "),
                    found.join(", ")
                ),
            ));
        }
    }

    Ok(df)
}

/// Per-column overview of a loaded export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub nulls: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

pub fn summarize(df: &DataFrame) -> FrameSummary {
    FrameSummary {
        rows: df.height(),
        columns: df
            .get_columns()
            .iter()
            .map(|column| ColumnSummary {
                name: column.name().to_string(),
                dtype: column.dtype().to_string(),
                nulls: column.null_count(),
            })
            .collect(),
    }
}
