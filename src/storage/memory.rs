//! In-memory record sink
//!
//! Keeps every record in arrival order without reconciling dedup keys, and
//! remembers the size of each batch. Used by `--dry-run` and by tests that
//! need to observe exactly what the crawler emitted.

use crate::model::CanonicalRecord;
use crate::storage::traits::{RecordSink, StorageResult};

#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<CanonicalRecord>,
    batch_sizes: Vec<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records received, in the order they were inserted
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Size of every batch received, one entry per `insert_batch` call
    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn insert_batch(&mut self, records: &[CanonicalRecord]) -> StorageResult<usize> {
        self.records.extend_from_slice(records);
        self.batch_sizes.push(records.len());
        Ok(records.len())
    }

    /// Returns the most recently inserted record with this key
    fn get_by_key(&self, key: &str) -> StorageResult<Option<CanonicalRecord>> {
        Ok(self
            .records
            .iter()
            .rev()
            .find(|record| record.dedup_key() == key)
            .cloned())
    }

    fn count(&self) -> StorageResult<u64> {
        Ok(self.records.len() as u64)
    }
}
