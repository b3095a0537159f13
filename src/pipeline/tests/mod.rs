//! Integration tests for the pipeline module
//!
//! Each test builds a throwaway root with a schema document and a batch
//! directory, then runs the full flow.

pub mod end_to_end;
pub mod round_trip;

use crate::config::{PipelineConfig, Stage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PHISHING_SCHEMA: &str = r#"{
    "SampleFileName": "phising_08012020_120000.csv",
    "LengthOfDateStampInFile": 8,
    "LengthOfTimeStampInFile": 6,
    "ColName": {
        "having_IP_Address": "Integer",
        "URL_Length": "Integer",
        "Shortining_Service": "Integer",
        "Result": "Integer"
    },
    "NumberofColumns": 4
}"#;

pub const HEADER: &str = "having_IP_Address,URL_Length,Shortining_Service,Result";

/// Root with the stage's schema document and an empty batch directory
pub fn create_root(temp_dir: &TempDir, stage: Stage) -> (PipelineConfig, PathBuf) {
    let root = temp_dir.path().to_path_buf();
    fs::write(root.join(stage.schema_file_name()), PHISHING_SCHEMA).unwrap();
    let batch_dir = root.join("batch");
    fs::create_dir_all(&batch_dir).unwrap();
    (PipelineConfig::for_stage(stage).with_root(&root), batch_dir)
}

/// Write a batch file with the standard header and the given data lines
pub fn write_batch_file(batch_dir: &Path, name: &str, rows: &[&str]) {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(batch_dir.join(name), content).unwrap();
}

/// Sorted file names directly inside `dir`; empty when it does not exist
pub fn names_in(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
