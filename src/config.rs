//! Configuration management and validation.
//!
//! The training and prediction stages share one implementation. Everything
//! that differs between them (directory names, schema document, table
//! handling) is carried by [`PipelineConfig`] and resolved into concrete
//! paths by [`StageLayout`].

use crate::constants::{
    ARCHIVE_DIR_SUFFIX, BAD_RAW_DIR, DATABASE_DIR_SUFFIX, DATABASE_EXTENSION, DEFAULT_TABLE_NAME,
    EXPORT_DIR_SUFFIX, EXPORT_FILE_NAME, GOOD_RAW_DIR, LOG_DIR_SUFFIX, VALIDATED_DIR_SUFFIX,
};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pipeline variant a run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Training,
    Prediction,
}

impl Stage {
    /// Name used as the prefix of every stage directory
    pub fn dir_prefix(&self) -> &'static str {
        match self {
            Stage::Training => "Training",
            Stage::Prediction => "Prediction",
        }
    }

    /// Default schema document for this stage
    pub fn schema_file_name(&self) -> &'static str {
        match self {
            Stage::Training => "schema_training.json",
            Stage::Prediction => "schema_prediction.json",
        }
    }

    /// Table handling this stage uses unless configured otherwise
    ///
    /// The training database persists across runs and keeps its table;
    /// the prediction database is rebuilt on every run.
    pub fn default_table_policy(&self) -> TablePolicy {
        match self {
            Stage::Training => TablePolicy::Reuse,
            Stage::Prediction => TablePolicy::Recreate,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_prefix())
    }
}

/// What `ensure_table` does when the target table already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TablePolicy {
    /// Keep the existing table and its rows
    Reuse,
    /// Drop the existing table and create it again, empty
    Recreate,
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stage this run belongs to
    pub stage: Stage,

    /// Directory every stage directory is created under
    pub root: PathBuf,

    /// Schema document; defaults to the stage's schema file under `root`
    pub schema_path: Option<PathBuf>,

    /// Table receiving accepted rows
    pub table_name: String,

    /// Existing-table handling; defaults to the stage's policy
    pub table_policy: Option<TablePolicy>,

    /// Delete the Good staging directory once its files are loaded
    pub purge_good_after_load: bool,

    /// Show a progress bar while classifying
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_stage(Stage::Training)
    }
}

impl PipelineConfig {
    /// Create the default configuration for a stage, rooted at the current directory
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            stage,
            root: PathBuf::from("."),
            schema_path: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            table_policy: None,
            purge_good_after_load: false,
            show_progress: false,
        }
    }

    /// Load a configuration document (JSON)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io(format!("reading config {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            PipelineError::configuration(format!("invalid config {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Set the stage
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Set the root directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Use a specific schema document
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Use a different table name
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Override the stage's table policy
    pub fn with_table_policy(mut self, policy: TablePolicy) -> Self {
        self.table_policy = Some(policy);
        self
    }

    /// Delete Good staging once loaded
    pub fn with_purge_good(mut self) -> Self {
        self.purge_good_after_load = true;
        self
    }

    /// Show a progress bar during classification
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Effective table policy
    pub fn table_policy(&self) -> TablePolicy {
        self.table_policy
            .unwrap_or_else(|| self.stage.default_table_policy())
    }

    /// Effective schema document path
    pub fn schema_path(&self) -> PathBuf {
        self.schema_path
            .clone()
            .unwrap_or_else(|| self.root.join(self.stage.schema_file_name()))
    }

    /// Resolve every directory and file this run touches
    pub fn layout(&self) -> StageLayout {
        StageLayout::new(&self.root, self.stage)
    }

    /// Reject settings the store cannot use safely
    ///
    /// The table name is interpolated into SQL, so it is restricted to an
    /// identifier.
    pub fn validate(&self) -> Result<()> {
        let name = self.table_name.as_str();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PipelineError::configuration(format!(
                "table name '{}' must be a non-empty identifier ([A-Za-z_][A-Za-z0-9_]*)",
                name
            )));
        }
        Ok(())
    }
}

/// Concrete paths for one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLayout {
    pub good_dir: PathBuf,
    pub bad_dir: PathBuf,
    pub archive_root: PathBuf,
    pub export_path: PathBuf,
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
}

impl StageLayout {
    pub fn new(root: &Path, stage: Stage) -> Self {
        let prefix = stage.dir_prefix();
        let validated = root.join(format!("{}{}", prefix, VALIDATED_DIR_SUFFIX));

        Self {
            good_dir: validated.join(GOOD_RAW_DIR),
            bad_dir: validated.join(BAD_RAW_DIR),
            archive_root: root.join(format!("{}{}", prefix, ARCHIVE_DIR_SUFFIX)),
            export_path: root
                .join(format!("{}{}", prefix, EXPORT_DIR_SUFFIX))
                .join(EXPORT_FILE_NAME),
            database_path: root
                .join(format!("{}{}", prefix, DATABASE_DIR_SUFFIX))
                .join(format!("{}.{}", prefix, DATABASE_EXTENSION)),
            log_dir: root.join(format!("{}{}", prefix, LOG_DIR_SUFFIX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_defaults_differ_only_in_table_policy_and_names() {
        let training = PipelineConfig::for_stage(Stage::Training);
        let prediction = PipelineConfig::for_stage(Stage::Prediction);

        assert_eq!(training.table_policy(), TablePolicy::Reuse);
        assert_eq!(prediction.table_policy(), TablePolicy::Recreate);
        assert_eq!(training.table_name, prediction.table_name);
        assert_eq!(training.schema_path(), PathBuf::from("./schema_training.json"));
        assert_eq!(
            prediction.schema_path(),
            PathBuf::from("./schema_prediction.json")
        );
    }

    #[test]
    fn test_table_policy_override() {
        let config = PipelineConfig::for_stage(Stage::Training)
            .with_table_policy(TablePolicy::Recreate);
        assert_eq!(config.table_policy(), TablePolicy::Recreate);
    }

    #[test]
    fn test_layout_paths() {
        let layout = StageLayout::new(Path::new("/data"), Stage::Prediction);

        assert_eq!(
            layout.good_dir,
            PathBuf::from("/data/Prediction_Raw_Files_Validated/Good_Raw")
        );
        assert_eq!(
            layout.bad_dir,
            PathBuf::from("/data/Prediction_Raw_Files_Validated/Bad_Raw")
        );
        assert_eq!(
            layout.archive_root,
            PathBuf::from("/data/PredictionArchivedBadData")
        );
        assert_eq!(
            layout.export_path,
            PathBuf::from("/data/Prediction_FileFromDB/InputFile.csv")
        );
        assert_eq!(
            layout.database_path,
            PathBuf::from("/data/Prediction_Database/Prediction.db")
        );
        assert_eq!(layout.log_dir, PathBuf::from("/data/Prediction_Logs"));
    }

    #[test]
    fn test_validate_table_name() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(
            PipelineConfig::default()
                .with_table_name("_raw2")
                .validate()
                .is_ok()
        );

        for bad in ["", "1table", "Good Raw", "t;DROP TABLE x", "\"quoted\""] {
            let result = PipelineConfig::default().with_table_name(bad).validate();
            assert!(
                matches!(result, Err(PipelineError::Configuration { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_file_applies_defaults_for_missing_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pipeline.json");
        std::fs::write(
            &path,
            r#"{"stage": "prediction", "root": "/srv/batches", "purge_good_after_load": true}"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.stage, Stage::Prediction);
        assert_eq!(config.root, PathBuf::from("/srv/batches"));
        assert!(config.purge_good_after_load);
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.table_policy(), TablePolicy::Recreate);
    }

    #[test]
    fn test_from_file_rejects_malformed_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pipeline.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = PipelineConfig::from_file(&path);
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }
}
