//! Storage traits and error types
//!
//! This module defines the interfaces the crawler writes through and the
//! associated error types.

use crate::crawler::CrawlReport;
use crate::model::CanonicalRecord;
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for the records produced by a crawl
///
/// The crawler calls [`insert_batch`](RecordSink::insert_batch) once per search
/// page, in page order, and never concurrently. It does not deduplicate;
/// records sharing a dedup key are reconciled by the sink.
pub trait RecordSink {
    /// Stores one page worth of records, returning how many were written
    fn insert_batch(&mut self, records: &[CanonicalRecord]) -> StorageResult<usize>;

    /// Looks up a stored record by its dedup key
    fn get_by_key(&self, key: &str) -> StorageResult<Option<CanonicalRecord>>;

    /// Number of records currently held
    fn count(&self) -> StorageResult<u64>;
}

/// Bookkeeping for crawl invocations
pub trait RunLog {
    /// Opens a run in the `running` state and returns its ID
    fn create_run(&mut self, config_hash: &str, contribution_type: &str) -> StorageResult<i64>;

    /// Marks a run completed with the outcome of the crawl
    fn complete_run(&mut self, run_id: i64, report: &CrawlReport) -> StorageResult<()>;

    /// Marks a run failed with the error that ended it
    fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
