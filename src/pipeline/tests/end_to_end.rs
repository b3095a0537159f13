//! Full-run integration tests

use super::{create_root, names_in, write_batch_file};
use crate::config::{PipelineConfig, Stage};
use crate::error::PipelineError;
use crate::logging::LogChannel;
use crate::models::TableOutcome;
use crate::pipeline::Pipeline;
use std::fs;
use tempfile::TempDir;

fn create_mixed_batch(batch_dir: &std::path::Path) {
    write_batch_file(batch_dir, "phising_20230101_120000.csv", &["1,-1,1,1", "-1,1,1,-1"]);
    write_batch_file(batch_dir, "phising_20230102_120000.csv", &["1,1,1,1"]);
    write_batch_file(batch_dir, "phising_2023010_120000.csv", &["1,1,1,1"]);
    write_batch_file(batch_dir, "random.csv", &["1,1,1,1"]);
}

#[test]
fn test_training_run_loads_archives_and_exports() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);
    create_mixed_batch(&batch_dir);

    let pipeline = Pipeline::new(config).unwrap();
    let stats = pipeline.run(&batch_dir).unwrap();
    let layout = pipeline.layout();

    assert_eq!(stats.stage, Stage::Training);
    assert_eq!(stats.files_seen, 4);
    assert_eq!(stats.files_good, 2);
    assert_eq!(stats.files_bad, 2);
    assert_eq!(stats.files_quarantined, 0);
    assert_eq!(stats.rows_inserted, 3);
    assert_eq!(stats.table, TableOutcome::Created);

    // Bad staging is archived and removed, Good staging stays
    assert!(!layout.bad_dir.exists());
    assert_eq!(stats.archive.files_archived, 2);
    let entry = stats.archive.entry.clone().unwrap();
    assert_eq!(
        names_in(&entry),
        vec!["phising_2023010_120000.csv", "random.csv"]
    );
    assert_eq!(
        names_in(&layout.good_dir),
        vec!["phising_20230101_120000.csv", "phising_20230102_120000.csv"]
    );

    // The batch itself is untouched
    assert_eq!(names_in(&batch_dir).len(), 4);

    assert_eq!(stats.export.path, layout.export_path);
    assert_eq!(stats.export.rows, 3);
    let exported = fs::read_to_string(&layout.export_path).unwrap();
    assert_eq!(
        exported,
        "\"having_IP_Address\",\"URL_Length\",\"Shortining_Service\",\"Result\"\r\n\
         \"1\",\"-1\",\"1\",\"1\"\r\n\
         \"-1\",\"1\",\"1\",\"-1\"\r\n\
         \"1\",\"1\",\"1\",\"1\"\r\n"
    );
}

#[test]
fn test_run_writes_every_audit_log() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);
    create_mixed_batch(&batch_dir);

    let pipeline = Pipeline::new(config).unwrap();
    pipeline.run(&batch_dir).unwrap();
    let log_dir = pipeline.layout().log_dir;

    for channel in [
        LogChannel::Main,
        LogChannel::Schema,
        LogChannel::NameValidation,
        LogChannel::General,
        LogChannel::Connection,
        LogChannel::TableCreate,
        LogChannel::Insert,
        LogChannel::Export,
    ] {
        let path = log_dir.join(channel.file_name());
        assert!(path.exists(), "missing {}", path.display());
    }

    let schema_log = fs::read_to_string(log_dir.join(LogChannel::Schema.file_name())).unwrap();
    assert!(schema_log.contains(
        "LengthOfDateStampInFile:: 8\tLengthOfTimeStampInFile:: 6\tNumberofColumns:: 4"
    ));
    let main_log = fs::read_to_string(log_dir.join(LogChannel::Main.file_name())).unwrap();
    assert!(main_log.contains("Start of Training validation"));
    assert!(main_log.contains("Training validation completed"));
}

#[test]
fn test_training_runs_accumulate_rows() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);
    write_batch_file(&batch_dir, "phising_20230101_120000.csv", &["1,1,1,1", "2,2,2,2"]);

    let pipeline = Pipeline::new(config).unwrap();
    let first = pipeline.run(&batch_dir).unwrap();
    let second = pipeline.run(&batch_dir).unwrap();

    assert_eq!(first.table, TableOutcome::Created);
    assert_eq!(second.table, TableOutcome::AlreadyExists);
    assert_eq!(first.export.rows, 2);
    assert_eq!(second.export.rows, 4);
}

#[test]
fn test_prediction_runs_start_from_empty_table() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Prediction);
    write_batch_file(&batch_dir, "phising_20230101_120000.csv", &["1,1,1,1", "2,2,2,2"]);

    let pipeline = Pipeline::new(config).unwrap();
    let first = pipeline.run(&batch_dir).unwrap();
    let second = pipeline.run(&batch_dir).unwrap();

    assert_eq!(first.table, TableOutcome::Created);
    assert_eq!(second.table, TableOutcome::Recreated);
    assert_eq!(second.export.rows, 2);
    assert!(
        pipeline
            .layout()
            .database_path
            .ends_with("Prediction_Database/Prediction.db")
    );
}

#[test]
fn test_empty_batch_exports_header_only() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);

    let pipeline = Pipeline::new(config).unwrap();
    let stats = pipeline.run(&batch_dir).unwrap();

    assert_eq!(stats.files_seen, 0);
    assert!(stats.archive.entry.is_none());
    assert!(!pipeline.layout().archive_root.exists());
    assert_eq!(stats.export.rows, 0);
    assert_eq!(
        fs::read_to_string(&stats.export.path).unwrap(),
        "\"having_IP_Address\",\"URL_Length\",\"Shortining_Service\",\"Result\"\r\n"
    );
}

#[test]
fn test_purge_good_removes_staging_after_load() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);
    write_batch_file(&batch_dir, "phising_20230101_120000.csv", &["1,1,1,1"]);

    let pipeline = Pipeline::new(config.with_purge_good()).unwrap();
    let stats = pipeline.run(&batch_dir).unwrap();

    assert_eq!(stats.rows_inserted, 1);
    assert!(!pipeline.layout().good_dir.exists());
    assert_eq!(stats.export.rows, 1);
}

#[test]
fn test_missing_schema_fails_and_logs() {
    let temp_dir = TempDir::new().unwrap();
    let batch_dir = temp_dir.path().join("batch");
    fs::create_dir_all(&batch_dir).unwrap();
    let config = PipelineConfig::for_stage(Stage::Training).with_root(temp_dir.path());

    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run(&batch_dir);

    assert!(matches!(result, Err(PipelineError::Schema { .. })));
    let layout = pipeline.layout();
    assert!(!layout.good_dir.exists());
    let main_log =
        fs::read_to_string(layout.log_dir.join(LogChannel::Main.file_name())).unwrap();
    assert!(main_log.contains("Training validation failed"));
}

#[test]
fn test_missing_batch_dir_is_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    let (config, _batch_dir) = create_root(&temp_dir, Stage::Training);

    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run(&temp_dir.path().join("absent"));

    assert!(matches!(result, Err(PipelineError::Validation { .. })));
}

#[test]
fn test_invalid_table_name_is_rejected() {
    let config = PipelineConfig::for_stage(Stage::Training).with_table_name("x; DROP TABLE y");
    let result = Pipeline::new(config);
    assert!(matches!(result, Err(PipelineError::Configuration { .. })));
}
