//! Process-local store for development and tests.
//!
//! Expiry uses `tokio::time::Instant`, so tests can drive TTLs with
//! `tokio::time::pause` and `advance`. Not suitable when more than one
//! process shares sessions.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::DomainError;

use super::r#trait::KeyValueStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory [`KeyValueStore`]
///
/// One mutex guards the whole map, which makes `set_if_absent` and
/// `get_and_delete` atomic. Expired entries are dropped on every write, so
/// keys that are never read again (blacklist entries) do not accumulate.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining TTL of a live key
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }

    /// Entries held in the map, expired ones included
    #[cfg(test)]
    pub(crate) async fn stored_entries(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Peek at a live value without consuming it
    pub async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone())
    }
}

fn prune_expired(entries: &mut HashMap<String, Entry>, now: Instant) {
    entries.retain(|_, entry| entry.is_live(now));
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        prune_expired(&mut entries, now);
        if ttl.is_zero() {
            entries.remove(key);
            return Ok(());
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        prune_expired(&mut entries, now);
        if entries.contains_key(key) {
            return Ok(false);
        }
        if ttl.is_zero() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn get_and_delete(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        Ok(entries
            .remove(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries.get(key).is_some_and(|e| e.is_live(now)))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        Ok(entries.remove(key).is_some_and(|e| e.is_live(now)))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let mut removed = 0;
        entries.retain(|key, entry| {
            if key.starts_with(prefix) {
                if entry.is_live(now) {
                    removed += 1;
                }
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
