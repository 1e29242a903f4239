//! Optimistic read-modify-write
//!
//! Merge operations re-read the aggregate, mutate it in memory and write it
//! back only if the stored version is still the one that was read. A lost
//! race repeats the whole cycle, including the mutation's own checks
//! against the fresh record, up to a bounded number of attempts.

use async_trait::async_trait;
use tracing::debug;

use super::{UseCaseError, UseCaseResult};
use crate::shared::error::Result;

/// An entity together with the store version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub entity: T,
    pub version: u64,
}

/// Outcome of a version-checked write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { version: u64 },
    /// Another writer got there first.
    Stale,
}

/// Repository operations needed for a conditional update cycle.
#[async_trait]
pub trait VersionedRepository<T: Send + Sync>: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Versioned<T>>>;

    async fn store_if_version(&self, entity: &T, expected_version: u64) -> Result<WriteOutcome>;
}

/// Bounded retry for conditional writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePolicy {
    pub max_attempts: u32,
}

impl WritePolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Load `key`, apply `mutate`, and write back conditionally.
///
/// `missing` builds the error returned when the aggregate does not exist.
/// Errors from `mutate` abort without writing. Returns the entity as
/// written.
pub async fn read_modify_write<T, R, M, F>(
    repo: &R,
    key: &str,
    policy: WritePolicy,
    missing: M,
    mut mutate: F,
) -> UseCaseResult<T>
where
    T: Send + Sync,
    R: VersionedRepository<T> + ?Sized,
    M: Fn() -> UseCaseError + Send,
    F: FnMut(&mut T) -> UseCaseResult<()> + Send,
{
    for attempt in 1..=policy.max_attempts {
        let Some(Versioned { mut entity, version }) = repo.load(key).await? else {
            return Err(missing());
        };

        mutate(&mut entity)?;

        match repo.store_if_version(&entity, version).await? {
            WriteOutcome::Written { .. } => return Ok(entity),
            WriteOutcome::Stale => {
                debug!(key, attempt, max_attempts = policy.max_attempts, "Stale write, retrying");
            }
        }
    }

    Err(UseCaseError::concurrency(
        "CONCURRENT_MODIFICATION",
        format!("Concurrent modification of {}, please retry", key),
    ))
}
