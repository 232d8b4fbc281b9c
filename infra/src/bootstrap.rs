//! Startup wiring: configuration, signing key, store, orchestrator

use std::sync::Arc;

use tg_core::repositories::KeyValueStore;
use tg_core::services::{CodecHandle, SessionOrchestrator, TokenCodec};
use tg_shared::config::AppConfig;

use crate::cache::connect_store;
use crate::InfrastructureError;

/// Everything a transport layer needs to serve requests
#[derive(Clone)]
pub struct TollgateServices {
    pub orchestrator: SessionOrchestrator,
    pub store: Arc<dyn KeyValueStore>,
}

impl TollgateServices {
    /// Store round trip for readiness probes
    pub async fn health_check(&self) -> Result<(), InfrastructureError> {
        Ok(self.store.ping().await?)
    }
}

/// Build the services from an already loaded configuration
///
/// Fails on invalid configuration, a weak or unreadable signing key, or a
/// store that does not answer `PING`. No request may be served in any of
/// those states.
pub async fn bootstrap(config: &AppConfig) -> Result<TollgateServices, InfrastructureError> {
    config.validate()?;

    if config.auth.jwt.is_using_default_secret() {
        tracing::warn!("Using the development signing secret");
    }

    let codec = TokenCodec::from_jwt_config(&config.auth.jwt)?;
    let store = connect_store(&config.cache).await?;
    store.ping().await?;

    let orchestrator =
        SessionOrchestrator::new(CodecHandle::new(codec), store.clone(), &config.auth);

    tracing::info!(
        environment = %config.environment,
        backend = ?config.cache.backend,
        "Tollgate services initialized"
    );
    Ok(TollgateServices {
        orchestrator,
        store,
    })
}

/// Load configuration from the environment, install logging, then bootstrap
pub async fn initialize() -> Result<TollgateServices, InfrastructureError> {
    let config = AppConfig::from_env();
    tg_shared::logging::init(&config.logging);
    tracing::info!("Initializing infrastructure services...");
    bootstrap(&config).await
}
