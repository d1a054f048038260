//! Storage module for persisting crawl results
//!
//! This module handles everything written by a crawl:
//! - The [`RecordSink`] the crawler hands each page of records to
//! - A SQLite-backed sink keyed by the contribution dedup key
//! - An in-memory sink for dry runs and tests
//! - A log of crawl runs

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemorySink;
pub use sqlite::{init_database, SqliteStorage};
pub use traits::{RecordSink, RunLog, StorageError, StorageResult};

use crate::FdioError;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, FdioError> {
    SqliteStorage::new(path)
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub contribution_type: String,
    pub status: RunStatus,
    pub pages_fetched: u32,
    pub records_emitted: u64,
    pub stop_reason: Option<String>,
    pub error_message: Option<String>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
