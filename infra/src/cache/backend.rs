//! Store selection from configuration

use std::sync::Arc;

use tg_core::repositories::{InMemoryStore, KeyValueStore};
use tg_shared::config::{CacheConfig, CacheType};

use super::redis_store::RedisStore;
use crate::InfrastructureError;

/// Build the configured store
///
/// The in-memory store is process-local: revocations and single-use checks
/// do not reach other instances, so it suits development and tests only.
pub async fn connect_store(
    config: &CacheConfig,
) -> Result<Arc<dyn KeyValueStore>, InfrastructureError> {
    match config.backend {
        CacheType::Redis => Ok(Arc::new(RedisStore::connect(config.clone()).await?)),
        CacheType::Memory => {
            tracing::warn!("Using in-memory store; state is not shared between processes");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
