//! [`KeyValueStore`] backed by Redis

use std::time::Duration;

use async_trait::async_trait;
use tg_core::errors::DomainError;
use tg_core::repositories::KeyValueStore;
use tg_shared::config::CacheConfig;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Redis store shared by every process instance
///
/// Keys are namespaced with the configured `key_prefix`. Every failure
/// surfaces as [`DomainError::StoreUnavailable`].
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Ok(Self::new(RedisClient::new(config).await?))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

/// Sub-millisecond TTLs round up so a positive TTL never means "no expiry"
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        if ttl.is_zero() {
            return Ok(());
        }
        Ok(self
            .client
            .set_with_expiry_ms(&self.key(key), value, ttl_millis(ttl))
            .await?)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, DomainError> {
        if ttl.is_zero() {
            return Ok(false);
        }
        Ok(self
            .client
            .set_if_absent_ms(&self.key(key), value, ttl_millis(ttl))
            .await?)
    }

    async fn get_and_delete(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.client.get_and_delete(&self.key(key)).await?)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.key(key)).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.client.delete(&self.key(key)).await?)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        Ok(self.client.delete_by_prefix(&self.key(prefix)).await?)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        if self.client.health_check().await? {
            Ok(())
        } else {
            Err(DomainError::StoreUnavailable {
                message: "unexpected PING reply".to_string(),
            })
        }
    }
}
