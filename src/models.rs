//! Core data structures and types for batch ingestion.
//!
//! Defines the batch snapshot, per-file verdicts and the reports each
//! pipeline step returns.

use crate::config::{Stage, TablePolicy};
use crate::error::{PipelineError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use walkdir::WalkDir;

/// Why a file was sent to Bad staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Name does not match the schema's filename pattern
    PatternMismatch,
    /// Date segment has the wrong length
    DateStampLength { expected: usize, found: usize },
    /// Time segment has the wrong length
    TimeStampLength { expected: usize, found: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PatternMismatch => write!(f, "name does not match the schema pattern"),
            RejectReason::DateStampLength { expected, found } => write!(
                f,
                "date stamp has {} characters, expected {}",
                found, expected
            ),
            RejectReason::TimeStampLength { expected, found } => write!(
                f,
                "time stamp has {} characters, expected {}",
                found, expected
            ),
        }
    }
}

/// Classification outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Bad(RejectReason),
}

impl Verdict {
    pub fn is_good(&self) -> bool {
        matches!(self, Verdict::Good)
    }
}

/// Files present in a batch directory when the run started
#[derive(Debug, Clone)]
pub struct Batch {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl Batch {
    /// Snapshot the regular files directly inside `dir`, sorted by name
    ///
    /// Sub-directories are skipped. Files created after this returns are
    /// not part of the batch.
    pub fn discover(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(PipelineError::validation(
                format!("listing batch directory {}", dir.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "batch directory not found"),
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                PipelineError::validation(
                    format!("listing batch directory {}", dir.display()),
                    e.into(),
                )
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            } else {
                debug!("Skipping non-file batch entry: {}", entry.path().display());
            }
        }
        files.sort();

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// File name as a string, lossily converted
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Result of classifying a batch
#[derive(Debug, Clone, Default)]
pub struct ClassificationReport {
    pub good: Vec<String>,
    pub bad: Vec<(String, RejectReason)>,
}

impl ClassificationReport {
    pub fn total(&self) -> usize {
        self.good.len() + self.bad.len()
    }
}

/// What `ensure_table` found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Created,
    AlreadyExists,
    Recreated,
}

impl TableOutcome {
    /// Outcome for a table that did or did not exist under `policy`
    pub fn for_policy(policy: TablePolicy, existed: bool) -> Self {
        match (policy, existed) {
            (_, false) => TableOutcome::Created,
            (TablePolicy::Reuse, true) => TableOutcome::AlreadyExists,
            (TablePolicy::Recreate, true) => TableOutcome::Recreated,
        }
    }
}

/// A Good file moved back to Bad after a row failed to insert
#[derive(Debug, Clone)]
pub struct QuarantinedFile {
    pub file: String,
    /// Rows of this file committed before the failure
    pub rows_committed: usize,
    pub error: String,
}

/// Result of loading the Good staging directory
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub loaded: Vec<(String, usize)>,
    pub quarantined: Vec<QuarantinedFile>,
}

impl LoadReport {
    /// Rows committed across loaded and quarantined files
    pub fn rows_inserted(&self) -> usize {
        self.loaded.iter().map(|(_, rows)| rows).sum::<usize>()
            + self
                .quarantined
                .iter()
                .map(|q| q.rows_committed)
                .sum::<usize>()
    }
}

/// Result of archiving Bad staging
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Archive entry created or reused; `None` when nothing was archived
    pub entry: Option<PathBuf>,
    pub files_archived: usize,
}

/// Result of exporting the table
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Summary of a complete run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub stage: Stage,
    pub files_seen: usize,
    pub files_good: usize,
    pub files_bad: usize,
    pub files_quarantined: usize,
    pub rows_inserted: usize,
    pub table: TableOutcome,
    pub archive: ArchiveReport,
    pub export: ExportReport,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_batch_discover_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("phising_20230101_120000.csv"), "a\n").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "b\n").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("inner.csv"), "c\n").unwrap();

        let batch = Batch::discover(temp_dir.path()).unwrap();

        assert_eq!(batch.len(), 2);
        let names: Vec<String> = batch.files().iter().map(|p| file_name_of(p)).collect();
        assert!(names.contains(&"phising_20230101_120000.csv".to_string()));
        assert!(names.contains(&"notes.txt".to_string()));
        assert!(!names.contains(&"inner.csv".to_string()));
    }

    #[test]
    fn test_batch_discover_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = Batch::discover(&temp_dir.path().join("absent"));
        assert!(matches!(result, Err(PipelineError::Validation { .. })));
    }

    #[test]
    fn test_table_outcome_for_policy() {
        assert_eq!(
            TableOutcome::for_policy(TablePolicy::Reuse, false),
            TableOutcome::Created
        );
        assert_eq!(
            TableOutcome::for_policy(TablePolicy::Recreate, false),
            TableOutcome::Created
        );
        assert_eq!(
            TableOutcome::for_policy(TablePolicy::Reuse, true),
            TableOutcome::AlreadyExists
        );
        assert_eq!(
            TableOutcome::for_policy(TablePolicy::Recreate, true),
            TableOutcome::Recreated
        );
    }

    #[test]
    fn test_load_report_counts_partial_commits() {
        let report = LoadReport {
            loaded: vec![("a.csv".to_string(), 3), ("b.csv".to_string(), 2)],
            quarantined: vec![QuarantinedFile {
                file: "c.csv".to_string(),
                rows_committed: 1,
                error: "arity".to_string(),
            }],
        };
        assert_eq!(report.rows_inserted(), 6);
    }
}
