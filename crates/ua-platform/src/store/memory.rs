//! In-memory document store.
//!
//! Records live in a single `DashMap` keyed by `(table, key)`; conditional
//! puts go through the entry API so the check and the write happen under
//! the same shard lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use super::{DocumentStore, PutCondition, StoreError, StoredRecord};

/// In-memory implementation of [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    records: DashMap<(String, String), StoredRecord>,
    /// Successful puts since creation.
    writes: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of successful writes performed so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn table_records(&self, table: &str) -> Vec<StoredRecord> {
        self.records
            .iter()
            .filter(|entry| entry.key().0 == table)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self
            .records
            .get(&(table.to_string(), key.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn query(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .table_records(table)
            .into_iter()
            .filter(|record| record.body.get(attribute).and_then(Value::as_str) == Some(value))
            .collect())
    }

    async fn scan(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.table_records(table))
    }

    async fn put(&self, table: &str, key: &str, body: Value, condition: PutCondition) -> Result<u64, StoreError> {
        let version = match self.records.entry((table.to_string(), key.to_string())) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().version;
                match condition {
                    PutCondition::NotExists => return Err(StoreError::condition_failed(table, key)),
                    PutCondition::Version(expected) if expected != current => {
                        return Err(StoreError::condition_failed(table, key));
                    }
                    PutCondition::Version(_) => {}
                }
                let record = entry.get_mut();
                record.version = current + 1;
                record.body = body;
                record.version
            }
            Entry::Vacant(entry) => {
                if let PutCondition::Version(_) = condition {
                    return Err(StoreError::condition_failed(table, key));
                }
                entry.insert(StoredRecord {
                    key: key.to_string(),
                    version: 1,
                    body,
                });
                1
            }
        };

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
