//! SQLite storage implementation
//!
//! This module provides a SQLite-backed [`RecordSink`] and [`RunLog`].

use crate::crawler::CrawlReport;
use crate::model::CanonicalRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, RunLog, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::FdioError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and applies the schema
    pub fn new(path: &Path) -> Result<Self, FdioError> {
        let conn = init_database(path)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, FdioError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Lists stored records, optionally restricted to one contribution type
    pub fn list_records(&self, kind: Option<&str>) -> StorageResult<Vec<CanonicalRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, description, author, url, uploadedon, showcase
             FROM acts WHERE ?1 IS NULL OR type = ?1 ORDER BY key",
        )?;

        let records = stmt
            .query_map(params![kind], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    Ok(CanonicalRecord {
        name: row.get(0)?,
        kind: row.get(1)?,
        description: row.get(2)?,
        author: row.get(3)?,
        url: row.get(4)?,
        uploaded_on: row.get(5)?,
        showcase: row.get(6)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        contribution_type: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        pages_fetched: row.get(6)?,
        records_emitted: row.get::<_, i64>(7)? as u64,
        stop_reason: row.get(8)?,
        error_message: row.get(9)?,
    })
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, contribution_type, status,
     pages_fetched, records_emitted, stop_reason, error_message";

impl RecordSink for SqliteStorage {
    fn insert_batch(&mut self, records: &[CanonicalRecord]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        {
            // Later stages own uploadedon and showcase, so a re-crawl leaves them alone
            let mut stmt = tx.prepare(
                "INSERT INTO acts
                    (key, name, type, description, author, url, uploadedon, showcase,
                     first_seen_at, last_seen_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                 ON CONFLICT(key) DO UPDATE SET
                    name = excluded.name,
                    type = excluded.type,
                    description = excluded.description,
                    author = excluded.author,
                    url = excluded.url,
                    last_seen_at = excluded.last_seen_at",
            )?;

            for record in records {
                stmt.execute(params![
                    record.dedup_key(),
                    record.name,
                    record.kind,
                    record.description,
                    record.author,
                    record.url,
                    record.uploaded_on,
                    record.showcase,
                    now,
                ])?;
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    fn get_by_key(&self, key: &str) -> StorageResult<Option<CanonicalRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT name, type, description, author, url, uploadedon, showcase
                 FROM acts WHERE key = ?1",
                params![key],
                record_from_row,
            )
            .optional()?;

        Ok(record)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM acts", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl RunLog for SqliteStorage {
    fn create_run(&mut self, config_hash: &str, contribution_type: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, contribution_type, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                now,
                config_hash,
                contribution_type,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, report: &CrawlReport) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3,
                 records_emitted = ?4, stop_reason = ?5
             WHERE id = ?6",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                report.pages_fetched,
                report.records_emitted as i64,
                report.stop.to_string(),
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, error_message, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}

/// Opens a database connection and applies the schema
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
