//! Archival of rejected files
//!
//! Bad files are kept so they can be sent back to whoever produced them.
//! Each archiving pass moves the Bad staging directory's files into a
//! `BadData_<date>_<time>` entry under the archive root. Entries are never
//! deleted by this crate.

use super::fsops::{list_files, move_into};
use crate::config::StageLayout;
use crate::constants::{ARCHIVE_DATE_FORMAT, ARCHIVE_ENTRY_PREFIX, ARCHIVE_TIME_FORMAT};
use crate::error::{PipelineError, Result};
use crate::logging::{LogChannel, RunLog};
use crate::models::ArchiveReport;

use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the archive entry for a given moment
///
/// Resolution is one second; two passes within the same second share an
/// entry.
pub fn archive_entry_name(now: DateTime<Local>) -> String {
    format!(
        "{}_{}_{}",
        ARCHIVE_ENTRY_PREFIX,
        now.format(ARCHIVE_DATE_FORMAT),
        now.format(ARCHIVE_TIME_FORMAT)
    )
}

/// Moves rejected files out of staging
#[derive(Debug)]
pub struct Archiver {
    layout: StageLayout,
    log: Arc<RunLog>,
}

impl Archiver {
    pub fn new(layout: StageLayout, log: Arc<RunLog>) -> Self {
        Self { layout, log }
    }

    /// Archive every file in Bad staging, then delete the Bad directory
    ///
    /// A missing or empty Bad directory creates no archive entry. Files
    /// moved before a failure stay in the archive.
    pub fn archive_bad(&self) -> Result<ArchiveReport> {
        self.archive_bad_at(Local::now())
    }

    fn archive_bad_at(&self, now: DateTime<Local>) -> Result<ArchiveReport> {
        let bad_dir = &self.layout.bad_dir;
        if !bad_dir.exists() {
            return Ok(ArchiveReport::default());
        }

        let files = list_files(bad_dir)
            .map_err(|e| self.failure(format!("listing {}", bad_dir.display()), e))?;

        let mut report = ArchiveReport::default();
        if !files.is_empty() {
            let entry = self.layout.archive_root.join(archive_entry_name(now));
            fs::create_dir_all(&entry)
                .map_err(|e| self.failure(format!("creating {}", entry.display()), e))?;

            for file in &files {
                move_into(file, &entry)
                    .map_err(|e| self.failure(format!("moving {}", file.display()), e))?;
                report.files_archived += 1;
            }
            self.log.info(
                LogChannel::General,
                format!(
                    "{} bad files moved to archive {}",
                    report.files_archived,
                    entry.display()
                ),
            );
            report.entry = Some(entry);
        }

        fs::remove_dir_all(bad_dir)
            .map_err(|e| self.failure(format!("deleting {}", bad_dir.display()), e))?;
        self.log
            .info(LogChannel::General, "Bad Raw Data Folder deleted successfully");

        Ok(report)
    }

    /// Delete the Good staging directory once its files are in the table
    pub fn purge_good(&self) -> Result<bool> {
        let good_dir = &self.layout.good_dir;
        if !good_dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(good_dir).map_err(|e| {
            self.log.warn(
                LogChannel::General,
                format!("Error while deleting Good_Raw directory: {}", e),
            );
            PipelineError::io(format!("deleting {}", good_dir.display()), e)
        })?;
        self.log
            .info(LogChannel::General, "Good_Raw directory deleted successfully");
        Ok(true)
    }

    /// Entries currently under the archive root, sorted by name
    pub fn entries(&self) -> Result<Vec<PathBuf>> {
        let root = &self.layout.archive_root;
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let read_dir = fs::read_dir(root)
            .map_err(|e| PipelineError::io(format!("listing {}", root.display()), e))?;
        for entry in read_dir {
            let path = entry
                .map_err(|e| PipelineError::io(format!("listing {}", root.display()), e))?
                .path();
            if path.is_dir() {
                entries.push(path);
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn failure(&self, operation: String, source: std::io::Error) -> PipelineError {
        self.log.warn(
            LogChannel::General,
            format!("Error while moving bad files to archive ({}): {}", operation, source),
        );
        PipelineError::archive(operation, source)
    }
}
