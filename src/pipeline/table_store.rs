//! SQLite table creation and row loading
//!
//! The table has one column per schema entry, in schema order, with the
//! declared type passed through verbatim. Rows are loaded from the Good
//! staging files one line at a time: each data line is used as the value
//! list of an `INSERT` statement and committed on its own. A file whose row
//! fails is moved back to Bad staging and loading carries on with the next
//! file; rows it committed before the failure stay in the table.

use super::fsops::{list_files, move_into};
use crate::config::{PipelineConfig, TablePolicy};
use crate::error::{PipelineError, Result};
use crate::logging::{LogChannel, RunLog};
use crate::models::{LoadReport, QuarantinedFile, TableOutcome, file_name_of};
use crate::schema::Schema;

use rusqlite::Connection;
use rusqlite::config::DbConfig;
use rusqlite::types::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Quote an identifier for SQLite
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE` statement for a schema
pub fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.sql_type))
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_identifier(table),
        columns.join(", ")
    )
}

/// Connection scoped to one logical operation
///
/// Opening and closing are both recorded on the connection log; the close
/// happens on drop so failure paths release the database too.
pub struct StoreConnection<'a> {
    conn: Connection,
    name: String,
    log: &'a RunLog,
}

impl<'a> StoreConnection<'a> {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path, log: &'a RunLog) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipelineError::io(format!("creating database directory {}", parent.display()), e)
            })?;
        }

        let conn = Connection::open(path)
            .and_then(|conn| {
                // Exported files quote every field; re-ingesting them relies
                // on double-quoted values being read as string literals.
                conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, true)?;
                Ok(conn)
            })
            .map_err(|e| {
                log.warn(
                    LogChannel::Connection,
                    format!("Error while connecting to database {}: {}", name, e),
                );
                PipelineError::database(format!("opening {}", path.display()), e)
            })?;

        log.info(
            LogChannel::Connection,
            format!("Opened {} database successfully", name),
        );
        Ok(Self { conn, name, log })
    }
}

impl Deref for StoreConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for StoreConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for StoreConnection<'_> {
    fn drop(&mut self) {
        self.log.info(
            LogChannel::Connection,
            format!("Closed {} database successfully", self.name),
        );
    }
}

/// Column names and every row of a table, in declared column order
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Read a whole table
pub fn read_table(conn: &Connection, table: &str) -> rusqlite::Result<TableSnapshot> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(table)))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<Value>>>()
        })?
        .collect::<rusqlite::Result<Vec<Vec<Value>>>>()?;

    Ok(TableSnapshot { columns, rows })
}

/// Whether `table` exists in the database
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(name) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// A row that could not be inserted, and what the file committed before it
struct RowFailure {
    rows_committed: usize,
    error: PipelineError,
}

/// Loads Good staging files into the ingestion table
#[derive(Debug)]
pub struct TableStore {
    database_path: PathBuf,
    table_name: String,
    policy: TablePolicy,
    good_dir: PathBuf,
    bad_dir: PathBuf,
    log: Arc<RunLog>,
}

impl TableStore {
    pub fn new(config: &PipelineConfig, log: Arc<RunLog>) -> Self {
        let layout = config.layout();
        Self {
            database_path: layout.database_path,
            table_name: config.table_name.clone(),
            policy: config.table_policy(),
            good_dir: layout.good_dir,
            bad_dir: layout.bad_dir,
            log,
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn connect(&self) -> Result<StoreConnection<'_>> {
        StoreConnection::open(&self.database_path, &self.log)
    }

    /// Make sure the table exists, honouring the configured policy
    pub fn ensure_table(&self, schema: &Schema) -> Result<TableOutcome> {
        let mut conn = self.connect()?;
        let result = self.apply_policy(&mut conn, schema);

        match result {
            Ok(TableOutcome::AlreadyExists) => {
                self.log.info(
                    LogChannel::TableCreate,
                    format!("Table '{}' already exists in database", self.table_name),
                );
                Ok(TableOutcome::AlreadyExists)
            }
            Ok(outcome) => {
                self.log.info(
                    LogChannel::TableCreate,
                    format!(
                        "Table '{}' {} successfully in database",
                        self.table_name,
                        if outcome == TableOutcome::Recreated {
                            "recreated"
                        } else {
                            "created"
                        }
                    ),
                );
                Ok(outcome)
            }
            Err(e) => {
                self.log.warn(
                    LogChannel::TableCreate,
                    format!("Error while creating table: {}", e),
                );
                Err(PipelineError::database("ensure_table", e))
            }
        }
    }

    fn apply_policy(&self, conn: &mut Connection, schema: &Schema) -> rusqlite::Result<TableOutcome> {
        let existed = table_exists(conn, &self.table_name)?;
        let outcome = TableOutcome::for_policy(self.policy, existed);

        if outcome != TableOutcome::AlreadyExists {
            let tx = conn.transaction()?;
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {};",
                quote_identifier(&self.table_name)
            ))?;
            tx.execute(&create_table_sql(&self.table_name, schema), [])?;
            tx.commit()?;
        }
        Ok(outcome)
    }

    /// Insert every data row of every Good staging file
    ///
    /// Fatal errors are limited to the database connection and file moves;
    /// row failures quarantine the file and are reported.
    pub fn load_good_files(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        if !self.good_dir.exists() {
            debug!("No Good_Raw directory at {}", self.good_dir.display());
            return Ok(report);
        }

        let files = list_files(&self.good_dir).map_err(|e| {
            self.log.warn(
                LogChannel::Insert,
                format!("Error while listing Good_Raw: {}", e),
            );
            PipelineError::io(format!("listing {}", self.good_dir.display()), e)
        })?;

        let mut conn = self.connect()?;

        for path in files {
            let file_name = file_name_of(&path);

            match self.load_file(&mut conn, &path, &file_name) {
                Ok(rows) => {
                    self.log.info(
                        LogChannel::Insert,
                        format!("{}: {} rows loaded successfully", file_name, rows),
                    );
                    report.loaded.push((file_name, rows));
                }
                Err(failure) if failure.error.is_recoverable() => {
                    self.log.warn(
                        LogChannel::Insert,
                        format!("Error while inserting into table: {}", failure.error),
                    );
                    self.quarantine(&path, &file_name)?;
                    report.quarantined.push(QuarantinedFile {
                        file: file_name,
                        rows_committed: failure.rows_committed,
                        error: failure.error.to_string(),
                    });
                }
                Err(failure) => return Err(failure.error),
            }
        }

        Ok(report)
    }

    /// Insert the data lines of one file, stopping at the first failure
    fn load_file(
        &self,
        conn: &mut Connection,
        path: &Path,
        file_name: &str,
    ) -> std::result::Result<usize, RowFailure> {
        let file = File::open(path)
            .map_err(|e| self.row_failure(file_name, 0, 0, format!("cannot open file: {}", e)))?;
        let mut lines = BufReader::new(file).lines();
        let mut committed = 0;

        // A file without even a header line cannot be loaded
        match lines.next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(self.row_failure(file_name, 1, 0, format!("cannot read line: {}", e)));
            }
            None => return Err(self.row_failure(file_name, 1, 0, "file is empty".to_string())),
        }

        for (index, line) in lines.enumerate() {
            let line_number = index + 2;
            let line = line.map_err(|e| {
                self.row_failure(file_name, line_number, committed, format!("cannot read line: {}", e))
            })?;

            if line.trim().is_empty() {
                return Err(self.row_failure(
                    file_name,
                    line_number,
                    committed,
                    "blank line".to_string(),
                ));
            }

            self.insert_row(conn, &line).map_err(|e| {
                self.row_failure(file_name, line_number, committed, e.to_string())
            })?;
            committed += 1;
        }

        Ok(committed)
    }

    /// Insert one value-list line in its own transaction
    fn insert_row(&self, conn: &mut Connection, line: &str) -> rusqlite::Result<()> {
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {} VALUES ({})",
                quote_identifier(&self.table_name),
                line
            ),
            [],
        )?;
        tx.commit()
    }

    fn row_failure(
        &self,
        file_name: &str,
        line: usize,
        rows_committed: usize,
        reason: String,
    ) -> RowFailure {
        RowFailure {
            rows_committed,
            error: PipelineError::Insert {
                file: file_name.to_string(),
                table: self.table_name.clone(),
                line,
                reason,
            },
        }
    }

    /// Move a file whose rows failed from Good back to Bad
    fn quarantine(&self, path: &Path, file_name: &str) -> Result<()> {
        std::fs::create_dir_all(&self.bad_dir)
            .and_then(|_| move_into(path, &self.bad_dir))
            .map_err(|e| {
                self.log.warn(
                    LogChannel::Insert,
                    format!("Error while moving {} to Bad_Raw: {}", file_name, e),
                );
                PipelineError::io(format!("quarantining {}", file_name), e)
            })?;

        self.log.info(
            LogChannel::Insert,
            format!("File moved to Bad_Raw: {}", file_name),
        );
        Ok(())
    }

    /// Number of rows currently in the table
    pub fn row_count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_identifier(&self.table_name)),
                [],
                |row| row.get(0),
            )
            .map_err(|e| PipelineError::database("row_count", e))?;
        Ok(count.max(0) as usize)
    }

    /// Every row of the table
    pub fn snapshot(&self) -> Result<TableSnapshot> {
        let conn = self.connect()?;
        read_table(&conn, &self.table_name).map_err(|e| PipelineError::database("snapshot", e))
    }
}
