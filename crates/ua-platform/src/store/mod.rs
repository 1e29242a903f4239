//! Document Store Seam
//!
//! The directories only ever talk to a table of JSON records keyed by a
//! string, through four calls: get, query, scan and put. Two backends:
//! - `MemoryDocumentStore` - in-process, for tests and local development
//! - `MongoDocumentStore` - one collection per table
//!
//! Every record carries a store-managed version so that read-modify-write
//! cycles can be made conditional (see [`PutCondition::Version`]).

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use mongo::MongoDocumentStore;

/// Store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write precondition did not hold (record exists, or version moved).
    #[error("Condition failed for {table}/{key}")]
    ConditionFailed { table: String, key: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt record {table}/{key}: {message}")]
    Corrupt { table: String, key: String, message: String },
}

impl StoreError {
    pub fn condition_failed(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ConditionFailed {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn is_condition_failed(&self) -> bool {
        matches!(self, Self::ConditionFailed { .. })
    }
}

/// Precondition for a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutCondition {
    /// Create only; fails if a record with the key exists.
    NotExists,
    /// Replace only if the stored version equals this value.
    Version(u64),
}

/// A record as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub key: String,
    pub version: u64,
    pub body: Value,
}

/// Keyed JSON document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one record by primary key.
    async fn get(&self, table: &str, key: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Records whose top-level string `attribute` equals `value`. Unordered.
    async fn query(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<StoredRecord>, StoreError>;

    /// Every record in the table. Unordered.
    async fn scan(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError>;

    /// Atomic single-record write. Returns the new version.
    async fn put(&self, table: &str, key: &str, body: Value, condition: PutCondition) -> Result<u64, StoreError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;
}

/// Table names for each record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub roles: String,
    pub users: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            roles: "Roles".to_string(),
            users: "Users".to_string(),
        }
    }
}

impl From<&ua_config::StoreConfig> for Tables {
    fn from(config: &ua_config::StoreConfig) -> Self {
        Self {
            roles: config.roles_table.clone(),
            users: config.users_table.clone(),
        }
    }
}
