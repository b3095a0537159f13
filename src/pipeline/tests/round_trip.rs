//! Feeding an export back through the pipeline

use super::{create_root, write_batch_file};
use crate::config::{Stage, TablePolicy};
use crate::pipeline::Pipeline;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_export_reingests_to_identical_table() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);
    write_batch_file(
        &batch_dir,
        "phising_20230101_120000.csv",
        &["1,-1,1,1", "-1,1,-1,-1", "0,0,1,-1"],
    );

    let first_run = Pipeline::new(config.clone()).unwrap();
    let first = first_run.run(&batch_dir).unwrap();
    let first_export = fs::read_to_string(&first.export.path).unwrap();

    // Re-ingest the export as a fresh batch into a recreated table
    let second_batch = temp_dir.path().join("second_batch");
    fs::create_dir_all(&second_batch).unwrap();
    fs::copy(
        &first.export.path,
        second_batch.join("phising_20230201_120000.csv"),
    )
    .unwrap();

    let second_run = Pipeline::new(config.with_table_policy(TablePolicy::Recreate)).unwrap();
    let second = second_run.run(&second_batch).unwrap();

    assert_eq!(second.files_quarantined, 0);
    assert_eq!(second.rows_inserted, 3);
    assert_eq!(fs::read_to_string(&second.export.path).unwrap(), first_export);
}

#[test]
fn test_prediction_stage_reingests_training_export() {
    let temp_dir = TempDir::new().unwrap();
    let (training, batch_dir) = create_root(&temp_dir, Stage::Training);
    write_batch_file(&batch_dir, "phising_20230101_120000.csv", &["1,1,-1,1"]);
    let training_stats = Pipeline::new(training).unwrap().run(&batch_dir).unwrap();

    let (prediction, prediction_batch) = create_root(&temp_dir, Stage::Prediction);
    fs::remove_dir_all(&prediction_batch).unwrap();
    fs::create_dir_all(&prediction_batch).unwrap();
    fs::copy(
        &training_stats.export.path,
        prediction_batch.join("phising_20230301_000000.csv"),
    )
    .unwrap();

    let prediction_stats = Pipeline::new(prediction).unwrap().run(&prediction_batch).unwrap();

    assert_eq!(prediction_stats.rows_inserted, 1);
    assert_eq!(
        fs::read_to_string(&prediction_stats.export.path).unwrap(),
        fs::read_to_string(&training_stats.export.path).unwrap()
    );
    assert_ne!(prediction_stats.export.path, training_stats.export.path);
}

#[test]
fn test_text_with_embedded_quotes_survives_reingest() {
    let temp_dir = TempDir::new().unwrap();
    let (config, batch_dir) = create_root(&temp_dir, Stage::Training);
    fs::write(
        temp_dir.path().join(Stage::Training.schema_file_name()),
        r#"{
            "SampleFileName": "wafer_08012020_120000.csv",
            "LengthOfDateStampInFile": 8,
            "LengthOfTimeStampInFile": 6,
            "ColName": {"Wafer": "varchar", "Sensor-1": "float", "Output": "Integer"},
            "NumberofColumns": 3
        }"#,
    )
    .unwrap();
    fs::write(
        batch_dir.join("wafer_20230101_120000.csv"),
        "Wafer,Sensor-1,Output\n'say \"hi\"',3.0,1\n'W-2',2.5,-1\n'C:\\dir\\',NULL,1\n",
    )
    .unwrap();

    let first = Pipeline::new(config.clone()).unwrap().run(&batch_dir).unwrap();
    assert_eq!(first.rows_inserted, 3);
    let first_export = fs::read_to_string(&first.export.path).unwrap();
    assert!(first_export.contains("\"say \"\"hi\"\"\",\"3.0\",\"1\""));

    let second_batch = temp_dir.path().join("second_batch");
    fs::create_dir_all(&second_batch).unwrap();
    fs::copy(&first.export.path, second_batch.join("wafer_20230201_120000.csv")).unwrap();

    let second = Pipeline::new(config.with_table_policy(TablePolicy::Recreate))
        .unwrap()
        .run(&second_batch)
        .unwrap();

    assert_eq!(second.files_quarantined, 0);
    assert_eq!(second.rows_inserted, 3);
    assert_eq!(fs::read_to_string(&second.export.path).unwrap(), first_export);
}
