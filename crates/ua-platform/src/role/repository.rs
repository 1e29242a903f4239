//! Role Repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::role::entity::Role;
use crate::shared::error::{PlatformError, Result};
use crate::store::{DocumentStore, PutCondition, StoreError, StoredRecord};
use crate::usecase::{Versioned, VersionedRepository, WriteOutcome};

pub struct RoleRepository {
    store: Arc<dyn DocumentStore>,
    table: String,
}

impl RoleRepository {
    pub fn new(store: Arc<dyn DocumentStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Every role; unordered.
    pub async fn find_all(&self) -> Result<Vec<Role>> {
        self.store
            .scan(&self.table)
            .await?
            .into_iter()
            .map(|record| self.decode(record).map(|v| v.entity))
            .collect()
    }

    /// Exact, case-sensitive lookup through the `name` key condition.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let records = self.store.query(&self.table, "name", name).await?;
        match records.into_iter().next() {
            Some(record) => Ok(Some(self.decode(record)?.entity)),
            None => Ok(None),
        }
    }

    pub async fn role_names(&self) -> Result<Vec<String>> {
        Ok(self.find_all().await?.into_iter().map(|r| r.name).collect())
    }

    /// Case-insensitive existence check across all role names.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let wanted = name.to_lowercase();
        Ok(self
            .role_names()
            .await?
            .iter()
            .any(|n| n.to_lowercase() == wanted))
    }

    /// Names from `requested` that are not role names (exact match),
    /// in request order.
    pub async fn unknown_names<S: AsRef<str> + Sync>(&self, requested: &[S]) -> Result<Vec<String>> {
        let known = self.role_names().await?;
        let mut unknown = Vec::new();
        for name in requested {
            let name: &str = name.as_ref();
            if !known.iter().any(|k| k == name) {
                unknown.push(name.to_string());
            }
        }
        Ok(unknown)
    }

    /// Create-only write; `Ok(false)` when the key is taken.
    pub async fn insert(&self, role: &Role) -> Result<bool> {
        let body = serde_json::to_value(role)?;
        match self.store.put(&self.table, &role.name, body, PutCondition::NotExists).await {
            Ok(_) => Ok(true),
            Err(StoreError::ConditionFailed { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn decode(&self, record: StoredRecord) -> Result<Versioned<Role>> {
        let entity: Role = serde_json::from_value(record.body).map_err(|e| {
            PlatformError::Store(StoreError::Corrupt {
                table: self.table.clone(),
                key: record.key.clone(),
                message: e.to_string(),
            })
        })?;
        Ok(Versioned {
            entity,
            version: record.version,
        })
    }
}

#[async_trait]
impl VersionedRepository<Role> for RoleRepository {
    async fn load(&self, key: &str) -> Result<Option<Versioned<Role>>> {
        match self.store.get(&self.table, key).await? {
            Some(record) => Ok(Some(self.decode(record)?)),
            None => Ok(None),
        }
    }

    async fn store_if_version(&self, role: &Role, expected_version: u64) -> Result<WriteOutcome> {
        let body = serde_json::to_value(role)?;
        match self
            .store
            .put(&self.table, &role.name, body, PutCondition::Version(expected_version))
            .await
        {
            Ok(version) => Ok(WriteOutcome::Written { version }),
            Err(StoreError::ConditionFailed { .. }) => Ok(WriteOutcome::Stale),
            Err(e) => Err(e.into()),
        }
    }
}
