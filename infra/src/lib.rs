//! # Infrastructure Layer
//!
//! Concrete adapters for the Tollgate core: the Redis-backed
//! `KeyValueStore` with retry and bounded deadlines, backend selection, and
//! the startup wiring that turns an `AppConfig` into a ready
//! `SessionOrchestrator`.
//!
//! ## Features
//!
//! - `redis-cache`: Enable Redis support (default)

pub mod bootstrap;
pub mod cache;

pub use bootstrap::{bootstrap, initialize, TollgateServices};
pub use cache::{connect_store, RedisClient, RedisStore};

use tg_core::errors::DomainError;
use tg_shared::config::ConfigLoadError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis command or connection error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A store call exceeded its deadline
    #[error("Cache {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigLoad(#[from] ConfigLoadError),

    /// Startup failure raised by the core (weak key, key load)
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl InfrastructureError {
    /// Transient failures worth retrying for idempotent commands
    pub fn is_retriable(&self) -> bool {
        match self {
            InfrastructureError::Cache(e) => cache::redis_client::is_retriable_error(e),
            InfrastructureError::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Domain(e) => e,
            InfrastructureError::Config(message) => DomainError::Configuration { message },
            InfrastructureError::ConfigLoad(e) => DomainError::Configuration {
                message: e.to_string(),
            },
            other => DomainError::StoreUnavailable {
                message: other.to_string(),
            },
        }
    }
}
