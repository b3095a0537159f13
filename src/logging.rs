//! Per-run audit logging.
//!
//! Every concern of a run (database connections, table creation, row
//! inserts, export, filename validation and so on) appends to its own text
//! file under the stage log directory, one `<date>/<time>\t\t<message>`
//! line per event. The same events are mirrored to `tracing` so they show
//! up on the console.
//!
//! A [`RunLog`] is opened once per run and handed to each component. Files
//! are opened lazily on first write and released by [`RunLog::close`] or on
//! drop, whichever comes first.

use crate::constants::{LOG_DATE_FORMAT, LOG_TIME_FORMAT};
use crate::error::{PipelineError, Result};
use chrono::Local;
use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Audit log file a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    Main,
    Schema,
    NameValidation,
    General,
    Connection,
    TableCreate,
    Insert,
    Export,
}

impl LogChannel {
    pub const ALL: &'static [LogChannel] = &[
        LogChannel::Main,
        LogChannel::Schema,
        LogChannel::NameValidation,
        LogChannel::General,
        LogChannel::Connection,
        LogChannel::TableCreate,
        LogChannel::Insert,
        LogChannel::Export,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            LogChannel::Main => "MainLog.txt",
            LogChannel::Schema => "valuesfromSchemaValidationLog.txt",
            LogChannel::NameValidation => "nameValidationLog.txt",
            LogChannel::General => "GeneralLog.txt",
            LogChannel::Connection => "DataBaseConnectionLog.txt",
            LogChannel::TableCreate => "DbTableCreateLog.txt",
            LogChannel::Insert => "DbInsertLog.txt",
            LogChannel::Export => "ExportToCsv.txt",
        }
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogChannel::Main => "main",
            LogChannel::Schema => "schema",
            LogChannel::NameValidation => "name_validation",
            LogChannel::General => "general",
            LogChannel::Connection => "connection",
            LogChannel::TableCreate => "table_create",
            LogChannel::Insert => "insert",
            LogChannel::Export => "export",
        };
        f.write_str(name)
    }
}

/// Format one audit line for the given local time
pub fn format_line(now: chrono::DateTime<Local>, message: &str) -> String {
    format!(
        "{}/{}\t\t{}\n",
        now.format(LOG_DATE_FORMAT),
        now.format(LOG_TIME_FORMAT),
        message
    )
}

/// Scoped handle over the per-concern log files of one run
#[derive(Debug)]
pub struct RunLog {
    log_dir: PathBuf,
    writers: Mutex<HashMap<LogChannel, LineWriter<File>>>,
}

impl RunLog {
    /// Open a run log rooted at `log_dir`, creating the directory
    pub fn open(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        std::fs::create_dir_all(&log_dir).map_err(|e| {
            PipelineError::io(format!("creating log directory {}", log_dir.display()), e)
        })?;

        Ok(Self {
            log_dir,
            writers: Mutex::new(HashMap::new()),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path of the file backing a channel
    pub fn path_for(&self, channel: LogChannel) -> PathBuf {
        self.log_dir.join(channel.file_name())
    }

    /// Record a routine event
    pub fn info(&self, channel: LogChannel, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(channel = %channel, "{}", message);
        self.append(channel, message);
    }

    /// Record a failure or rejected input
    pub fn warn(&self, channel: LogChannel, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!(channel = %channel, "{}", message);
        self.append(channel, message);
    }

    /// Flush and release every open log file
    ///
    /// Further writes reopen the files in append mode.
    pub fn close(&self) {
        let mut writers = self.lock();
        for (channel, writer) in writers.iter_mut() {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush {} log: {}", channel, e);
            }
        }
        writers.clear();
    }

    fn append(&self, channel: LogChannel, message: &str) {
        let line = format_line(Local::now(), message);
        let mut writers = self.lock();

        if !writers.contains_key(&channel) {
            match self.open_channel(channel) {
                Ok(writer) => {
                    writers.insert(channel, writer);
                }
                Err(e) => {
                    warn!(
                        "Cannot open {} log at {}: {}",
                        channel,
                        self.path_for(channel).display(),
                        e
                    );
                    return;
                }
            }
        }

        if let Some(writer) = writers.get_mut(&channel) {
            if let Err(e) = writer.write_all(line.as_bytes()) {
                warn!("Failed to write {} log: {}", channel, e);
            }
        }
    }

    fn open_channel(&self, channel: LogChannel) -> std::io::Result<LineWriter<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(channel))?;
        Ok(LineWriter::new(file))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<LogChannel, LineWriter<File>>> {
        match self.writers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Run log mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        self.close();
    }
}
