mod http_tests;

use std::sync::Arc;

use tg_shared::config::{AuthConfig, RefreshCookieConfig};

use crate::repositories::store::{InMemoryStore, KeyValueStore};
use crate::services::orchestrator::SessionOrchestrator;
use crate::services::token::{CodecHandle, SigningKeys, TokenCodec, TokenCodecConfig};

pub(crate) fn setup() -> (Arc<InMemoryStore>, SessionOrchestrator) {
    setup_with(TokenCodecConfig::default())
}

pub(crate) fn setup_with(codec_config: TokenCodecConfig) -> (Arc<InMemoryStore>, SessionOrchestrator) {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = orchestrator_over(store.clone(), codec_config);
    (store, orchestrator)
}

pub(crate) fn orchestrator_over(
    store: Arc<dyn KeyValueStore>,
    codec_config: TokenCodecConfig,
) -> SessionOrchestrator {
    let codec = TokenCodec::new(
        codec_config,
        SigningKeys::hmac(b"orchestrator-test-secret-0123456789abcdef").unwrap(),
    )
    .unwrap();
    let config = AuthConfig {
        refresh_cookie: RefreshCookieConfig::development(),
        ..Default::default()
    };
    SessionOrchestrator::new(CodecHandle::new(codec), store, &config)
}
