//! Batch validation and ingestion engine.
//!
//! A run reads the schema, partitions the batch into Good and Bad staging
//! by file name, loads the Good files into SQLite (sending files with
//! unusable rows back to Bad), archives Bad staging and exports the table
//! as a single CSV file. The steps are strictly sequential.

mod fsops;

pub mod archiver;
pub mod classifier;
pub mod exporter;
pub mod table_store;

#[cfg(test)]
pub mod tests;

use self::{
    archiver::Archiver, classifier::FileClassifier, exporter::Exporter, table_store::TableStore,
};

use crate::config::{PipelineConfig, StageLayout};
use crate::error::Result;
use crate::logging::{LogChannel, RunLog};
use crate::models::RunStats;
use crate::schema::load_schema;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs the whole validation and ingestion flow for one stage
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting unusable configuration up front
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn layout(&self) -> StageLayout {
        self.config.layout()
    }

    /// Validate, load, archive and export `batch_dir`
    ///
    /// The run log is closed before returning on every path.
    pub fn run(&self, batch_dir: &Path) -> Result<RunStats> {
        let start_time = Instant::now();
        let layout = self.layout();
        let log = Arc::new(RunLog::open(&layout.log_dir)?);

        log.info(
            LogChannel::Main,
            format!(
                "Start of {} validation on files in {}",
                self.config.stage,
                batch_dir.display()
            ),
        );

        let result = self.run_steps(batch_dir, layout, &log, start_time);
        match &result {
            Ok(stats) => log.info(
                LogChannel::Main,
                format!(
                    "{} validation completed: {} good, {} bad, {} quarantined, {} rows",
                    self.config.stage,
                    stats.files_good,
                    stats.files_bad,
                    stats.files_quarantined,
                    stats.rows_inserted
                ),
            ),
            Err(e) => log.warn(
                LogChannel::Main,
                format!("{} validation failed: {}", self.config.stage, e),
            ),
        }

        log.close();
        result
    }

    fn run_steps(
        &self,
        batch_dir: &Path,
        layout: StageLayout,
        log: &Arc<RunLog>,
        start_time: Instant,
    ) -> Result<RunStats> {
        let schema = load_schema(&self.config.schema_path(), log)?;
        debug!(
            "Schema expects {} columns, file pattern {}",
            schema.column_count(),
            schema.filename_pattern()
        );

        let classification = FileClassifier::new(layout.clone(), Arc::clone(log))
            .with_progress(self.config.show_progress)
            .classify(batch_dir, &schema)?;
        log.info(LogChannel::Main, "Raw data validation complete");

        log.info(
            LogChannel::Main,
            format!("Creating {} database and table from schema", self.config.stage),
        );
        let store = TableStore::new(&self.config, Arc::clone(log));
        let table = store.ensure_table(&schema)?;
        log.info(LogChannel::Main, "Table creation completed");

        log.info(LogChannel::Main, "Insertion of data into table started");
        let load = store.load_good_files()?;
        log.info(LogChannel::Main, "Insertion in table completed");

        let archiver = Archiver::new(layout, Arc::clone(log));
        if self.config.purge_good_after_load && archiver.purge_good()? {
            log.info(LogChannel::Main, "Good data folder deleted");
        }

        let archive = archiver.archive_bad()?;
        log.info(
            LogChannel::Main,
            "Moved bad files to archive and deleted bad data folder",
        );

        log.info(LogChannel::Main, "Extracting csv file from table");
        let export = Exporter::new(&self.config, Arc::clone(log)).export()?;

        Ok(RunStats {
            stage: self.config.stage,
            files_seen: classification.total(),
            files_good: classification.good.len(),
            files_bad: classification.bad.len(),
            files_quarantined: load.quarantined.len(),
            rows_inserted: load.rows_inserted(),
            table,
            archive,
            export,
            elapsed: start_time.elapsed(),
        })
    }
}
