//! User Repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::shared::error::{PlatformError, Result};
use crate::store::{DocumentStore, PutCondition, StoreError, StoredRecord};
use crate::usecase::{Versioned, VersionedRepository, WriteOutcome};
use crate::user::entity::User;

pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<User>> {
        let records = self.store.scan(&self.table).await?;
        let mut users = Vec::with_capacity(records.len());
        for record in records {
            users.push(self.decode(record)?.entity);
        }
        Ok(users)
    }

    /// Exact match on `username`.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let records = self.store.query(&self.table, "username", username).await?;
        match records.into_iter().next() {
            Some(record) => Ok(Some(self.decode(record)?.entity)),
            None => Ok(None),
        }
    }

    /// Create-only write; `Ok(false)` when the username is taken.
    pub async fn insert(&self, user: &User) -> Result<bool> {
        let body = serde_json::to_value(user)?;
        match self.store.put(&self.table, &user.username, body, PutCondition::NotExists).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_condition_failed() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn decode(&self, record: StoredRecord) -> Result<Versioned<User>> {
        match serde_json::from_value(record.body) {
            Ok(entity) => Ok(Versioned {
                entity,
                version: record.version,
            }),
            Err(e) => Err(PlatformError::Store(StoreError::Corrupt {
                table: self.table.clone(),
                key: record.key,
                message: e.to_string(),
            })),
        }
    }
}

#[async_trait]
impl VersionedRepository<User> for UserRepository {
    async fn load(&self, key: &str) -> Result<Option<Versioned<User>>> {
        self.store
            .get(&self.table, key)
            .await?
            .map(|record| self.decode(record))
            .transpose()
    }

    async fn store_if_version(&self, user: &User, expected_version: u64) -> Result<WriteOutcome> {
        let body = serde_json::to_value(user)?;
        let put = self
            .store
            .put(&self.table, &user.username, body, PutCondition::Version(expected_version))
            .await;
        match put {
            Ok(version) => Ok(WriteOutcome::Written { version }),
            Err(e) if e.is_condition_failed() => Ok(WriteOutcome::Stale),
            Err(e) => Err(e.into()),
        }
    }
}
