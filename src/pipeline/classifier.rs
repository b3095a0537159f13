//! Filename validation and Good/Bad partitioning
//!
//! Each run starts from empty staging directories. Every file of the batch
//! is copied (never moved) into exactly one of them according to its name.
//! Column layout is not looked at here; malformed rows are caught when the
//! table store loads the Good files.

use super::fsops::recreate_dir;
use crate::config::StageLayout;
use crate::constants::PROGRESS_TEMPLATE;
use crate::error::{PipelineError, Result};
use crate::logging::{LogChannel, RunLog};
use crate::models::{Batch, ClassificationReport, RejectReason, Verdict, file_name_of};
use crate::schema::Schema;

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Decide where a file belongs from its name alone
pub fn classify_name(name: &str, schema: &Schema) -> Verdict {
    if !schema.filename_pattern().is_match(name) {
        return Verdict::Bad(RejectReason::PatternMismatch);
    }

    let stem = name.strip_suffix(".csv").unwrap_or(name);
    let segments: Vec<&str> = stem.split('_').collect();
    let date_len = segments.get(1).map_or(0, |s| s.len());
    let time_len = segments.get(2).map_or(0, |s| s.len());

    if date_len != schema.date_stamp_length() {
        return Verdict::Bad(RejectReason::DateStampLength {
            expected: schema.date_stamp_length(),
            found: date_len,
        });
    }
    if time_len != schema.time_stamp_length() {
        return Verdict::Bad(RejectReason::TimeStampLength {
            expected: schema.time_stamp_length(),
            found: time_len,
        });
    }

    Verdict::Good
}

/// Partitions a batch into the Good and Bad staging directories
#[derive(Debug)]
pub struct FileClassifier {
    layout: StageLayout,
    log: Arc<RunLog>,
    show_progress: bool,
}

impl FileClassifier {
    pub fn new(layout: StageLayout, log: Arc<RunLog>) -> Self {
        Self {
            layout,
            log,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Classify every file in `batch_dir` against `schema`
    ///
    /// An I/O failure aborts the whole operation. Files copied before the
    /// failure stay where they are.
    pub fn classify(&self, batch_dir: &Path, schema: &Schema) -> Result<ClassificationReport> {
        self.reset_staging()?;

        let batch = Batch::discover(batch_dir).inspect_err(|e| {
            self.log.warn(
                LogChannel::NameValidation,
                format!("Error occurred while validating FileName: {}", e),
            );
        })?;
        debug!(
            "Classifying {} files from {}",
            batch.len(),
            batch.dir().display()
        );

        let progress = self.progress_bar(batch.len() as u64);
        let mut report = ClassificationReport::default();

        for path in batch.files() {
            let name = file_name_of(path);
            let verdict = classify_name(&name, schema);
            self.stage_file(path, &name, &verdict)?;

            match verdict {
                Verdict::Good => {
                    self.log.info(
                        LogChannel::NameValidation,
                        format!("Valid File name! File copied to Good_Raw: {}", name),
                    );
                    report.good.push(name);
                }
                Verdict::Bad(reason) => {
                    self.log.warn(
                        LogChannel::NameValidation,
                        format!(
                            "Invalid File name! File copied to Bad_Raw: {} ({})",
                            name, reason
                        ),
                    );
                    report.bad.push((name, reason));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(report)
    }

    /// Destroy and recreate Bad, then Good
    fn reset_staging(&self) -> Result<()> {
        for (label, dir) in [("Bad_Raw", &self.layout.bad_dir), ("Good_Raw", &self.layout.good_dir)] {
            recreate_dir(dir).map_err(|e| {
                self.log.warn(
                    LogChannel::General,
                    format!("Error while recreating {} directory: {}", label, e),
                );
                PipelineError::validation(format!("recreating {}", dir.display()), e)
            })?;
            self.log.info(
                LogChannel::General,
                format!("{} directory recreated before starting validation", label),
            );
        }
        Ok(())
    }

    fn stage_file(&self, source: &Path, name: &str, verdict: &Verdict) -> Result<()> {
        let target_dir = if verdict.is_good() {
            &self.layout.good_dir
        } else {
            &self.layout.bad_dir
        };

        fs::copy(source, target_dir.join(name)).map_err(|e| {
            self.log.warn(
                LogChannel::NameValidation,
                format!("Error occurred while validating FileName {}: {}", name, e),
            );
            PipelineError::validation(format!("copying {}", source.display()), e)
        })?;
        Ok(())
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("validating file names");
        pb
    }
}
