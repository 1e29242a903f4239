//! MongoDB document store.
//!
//! One collection per table. The record key is stored in `_id` and the
//! store-managed version in `_version`; both are stripped before the body is
//! handed back to callers.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde_json::Value;

use super::{DocumentStore, PutCondition, StoreError, StoredRecord};

const VERSION_FIELD: &str = "_version";

pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect and select `database`.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = mongodb::Client::with_uri_str(uri).await?;
        Ok(Self::new(client.database(database)))
    }

    fn collection(&self, table: &str) -> Collection<Document> {
        self.db.collection(table)
    }

    async fn insert(&self, table: &str, key: &str, body: &Value) -> Result<u64, StoreError> {
        let document = to_document(key, body, 1)?;
        match self.collection(table).insert_one(document).await {
            Ok(_) => Ok(1),
            Err(e) if is_duplicate_key_error(&e) => Err(StoreError::condition_failed(table, key)),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, table: &str, key: &str, body: &Value, expected: u64) -> Result<u64, StoreError> {
        let next = expected + 1;
        let document = to_document(key, body, next)?;
        let filter = if expected == 0 {
            // unversioned records carry no version field at all
            doc! { "_id": key, VERSION_FIELD: { "$exists": false } }
        } else {
            doc! { "_id": key, VERSION_FIELD: expected as i64 }
        };
        let result = self.collection(table).replace_one(filter, document).await?;

        if result.matched_count == 0 {
            return Err(StoreError::condition_failed(table, key));
        }
        Ok(next)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<StoredRecord>, StoreError> {
        let found = self.collection(table).find_one(doc! { "_id": key }).await?;
        found.map(|d| from_document(table, d)).transpose()
    }

    async fn query(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let cursor = self.collection(table).find(doc! { attribute: value }).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        documents.into_iter().map(|d| from_document(table, d)).collect()
    }

    async fn scan(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let cursor = self.collection(table).find(doc! {}).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        documents.into_iter().map(|d| from_document(table, d)).collect()
    }

    async fn put(&self, table: &str, key: &str, body: Value, condition: PutCondition) -> Result<u64, StoreError> {
        match condition {
            PutCondition::NotExists => self.insert(table, key, &body).await,
            PutCondition::Version(expected) => self.replace(table, key, &body, expected).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mongodb"
    }
}

/// Check if a MongoDB error is a duplicate key error (code 11000)
fn is_duplicate_key_error(error: &mongodb::error::Error) -> bool {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_error)) =
        error.kind.as_ref()
    {
        return write_error.code == 11000;
    }
    false
}

fn to_document(key: &str, body: &Value, version: u64) -> Result<Document, StoreError> {
    let mut document = bson::to_document(body).map_err(|e| StoreError::Serialization(e.to_string()))?;
    document.insert("_id", key);
    document.insert(VERSION_FIELD, version as i64);
    Ok(document)
}

fn from_document(table: &str, mut document: Document) -> Result<StoredRecord, StoreError> {
    let key = match document.remove("_id") {
        Some(Bson::String(key)) => key,
        other => {
            return Err(StoreError::Corrupt {
                table: table.to_string(),
                key: format!("{:?}", other),
                message: "_id is not a string".to_string(),
            })
        }
    };
    let version = match document.remove(VERSION_FIELD) {
        Some(Bson::Int64(v)) if v >= 0 => v as u64,
        Some(Bson::Int32(v)) if v >= 0 => v as u64,
        // records written by other tools start unversioned
        None => 0,
        Some(other) => {
            return Err(StoreError::Corrupt {
                table: table.to_string(),
                key,
                message: format!("unexpected {} value {}", VERSION_FIELD, other),
            })
        }
    };

    Ok(StoredRecord {
        key,
        version,
        body: Bson::Document(document).into_relaxed_extjson(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_round_trip_strips_bookkeeping() {
        let body = json!({"name": "Admin", "modules": [{"name": "Billing", "permissions": ["view"]}]});
        let document = to_document("Admin", &body, 4).unwrap();
        assert_eq!(document.get_str("_id").unwrap(), "Admin");
        assert_eq!(document.get_i64(VERSION_FIELD).unwrap(), 4);

        let record = from_document("Roles", document).unwrap();
        assert_eq!(record.key, "Admin");
        assert_eq!(record.version, 4);
        assert_eq!(record.body, body);
    }

    #[test]
    fn test_unversioned_document_reads_as_zero() {
        let record = from_document("Users", doc! { "_id": "alice", "username": "alice" }).unwrap();
        assert_eq!(record.version, 0);
        assert_eq!(record.body, json!({"username": "alice"}));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let err = to_document("x", &json!(["not", "an", "object"]), 1).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
