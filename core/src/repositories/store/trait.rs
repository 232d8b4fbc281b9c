//! Key-value store trait: the only shared mutable state the services touch.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;

/// TTL-capable key-value store shared by every process instance
///
/// Every method must either complete or return
/// [`DomainError::StoreUnavailable`] within a bounded time. A failed call is
/// never reported as "key absent".
///
/// # Atomicity
/// - `set_if_absent` creates a key only when no live key exists
/// - `get_and_delete` reads and removes a key in one indivisible step; of
///   any number of concurrent callers on the same key at most one receives
///   the value
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Unconditionally store `value` under `key`, expiring after `ttl`
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Store `value` under `key` only if the key does not exist
    ///
    /// # Returns
    /// * `Ok(true)` - Key created
    /// * `Ok(false)` - Key already present, nothing written
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, DomainError>;

    /// Atomically read and delete `key`
    async fn get_and_delete(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Whether a live key exists
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Delete `key`; deleting a missing key is not an error
    ///
    /// # Returns
    /// * `Ok(true)` - A key was removed
    /// * `Ok(false)` - Nothing to remove
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Delete every key starting with `prefix`, returning how many were removed
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError>;

    /// Health probe
    async fn ping(&self) -> Result<(), DomainError>;
}
