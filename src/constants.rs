//! Application constants for the batch ingestion pipeline
//!
//! Directory names, log file names, schema document keys and default
//! values shared by the training and prediction stages.

// =============================================================================
// Schema Document Keys
// =============================================================================

/// Keys every schema document must carry
pub mod schema_keys {
    pub const SAMPLE_FILE_NAME: &str = "SampleFileName";
    pub const DATE_STAMP_LENGTH: &str = "LengthOfDateStampInFile";
    pub const TIME_STAMP_LENGTH: &str = "LengthOfTimeStampInFile";
    pub const COLUMN_NAMES: &str = "ColName";
    pub const COLUMN_COUNT: &str = "NumberofColumns";

    /// All required keys, in the order they are reported when missing
    pub const REQUIRED: &[&str] = &[
        SAMPLE_FILE_NAME,
        DATE_STAMP_LENGTH,
        TIME_STAMP_LENGTH,
        COLUMN_NAMES,
        COLUMN_COUNT,
    ];
}

// =============================================================================
// Filesystem Layout
// =============================================================================

/// Suffix of the directory holding both staging areas
pub const VALIDATED_DIR_SUFFIX: &str = "_Raw_Files_Validated";

/// Staging directory for files that passed filename validation
pub const GOOD_RAW_DIR: &str = "Good_Raw";

/// Staging directory for rejected files
pub const BAD_RAW_DIR: &str = "Bad_Raw";

/// Suffix of the archive root directory
pub const ARCHIVE_DIR_SUFFIX: &str = "ArchivedBadData";

/// Prefix of each timestamped archive entry
pub const ARCHIVE_ENTRY_PREFIX: &str = "BadData";

/// Suffix of the export directory
pub const EXPORT_DIR_SUFFIX: &str = "_FileFromDB";

/// File name of the canonical export consumed downstream
pub const EXPORT_FILE_NAME: &str = "InputFile.csv";

/// Suffix of the database directory
pub const DATABASE_DIR_SUFFIX: &str = "_Database";

/// Suffix of the per-stage log directory
pub const LOG_DIR_SUFFIX: &str = "_Logs";

// =============================================================================
// Database Defaults
// =============================================================================

/// Table holding every accepted row
pub const DEFAULT_TABLE_NAME: &str = "Good_Raw_Data";

/// Extension of the SQLite database file
pub const DATABASE_EXTENSION: &str = "db";

// =============================================================================
// Log Format
// =============================================================================

/// Date part of each audit log line
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d";

/// Time part of each audit log line
pub const LOG_TIME_FORMAT: &str = "%H:%M:%S";

/// Date part of an archive entry name
pub const ARCHIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Time part of an archive entry name (seconds resolution)
pub const ARCHIVE_TIME_FORMAT: &str = "%H%M%S";

// =============================================================================
// CLI Defaults
// =============================================================================

/// Log target used by the default tracing filter
pub const LOG_TARGET: &str = "batch_ingest";

/// Progress bar template for batch classification
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_schema_keys_are_unique() {
        let mut keys = schema_keys::REQUIRED.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), schema_keys::REQUIRED.len());
    }

    #[test]
    fn test_archive_timestamp_has_seconds_resolution() {
        let stamp = chrono::NaiveDate::from_ymd_opt(2023, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 5))
            .unwrap();
        assert_eq!(stamp.format(ARCHIVE_TIME_FORMAT).to_string(), "120005");
        assert_eq!(stamp.format(ARCHIVE_DATE_FORMAT).to_string(), "2023-01-01");
    }
}
