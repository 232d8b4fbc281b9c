//! Blacklist of access tokens revoked before their natural expiry

use std::sync::Arc;

use crate::errors::DomainError;
use crate::repositories::store::{keys, KeyValueStore};
use crate::services::token::CodecHandle;

/// Sentinel stored under each blacklist key
const BLACKLISTED: &str = "1";

/// Records revoked access tokens under `blacklist:<sha256(token)>`
///
/// Each entry lives as long as `verify` would still accept the token it
/// blocks, clock-skew leeway included, so the blacklist never grows past the
/// set of still-accepted tokens.
#[derive(Clone)]
pub struct BlacklistStore {
    store: Arc<dyn KeyValueStore>,
    codec: CodecHandle,
}

impl BlacklistStore {
    pub fn new(store: Arc<dyn KeyValueStore>, codec: CodecHandle) -> Self {
        Self { store, codec }
    }

    /// Blacklist `token` until `verify` would reject it anyway
    ///
    /// # Returns
    /// * `Ok(true)` - Entry written
    /// * `Ok(false)` - Token past its acceptance window or unverifiable; nothing to block
    pub async fn add(&self, token: &str) -> Result<bool, DomainError> {
        let window = self.codec.current().acceptance_window(token);
        let ttl = match window.to_std() {
            Ok(ttl) if !ttl.is_zero() => ttl,
            _ => {
                tracing::debug!("Skipping blacklist for expired or invalid token");
                return Ok(false);
            }
        };

        self.store
            .set_with_ttl(&keys::blacklist_key(token), BLACKLISTED, ttl)
            .await?;

        tracing::info!(ttl_ms = ttl.as_millis() as u64, "Access token blacklisted");
        Ok(true)
    }

    /// Whether `token` has been blacklisted
    pub async fn contains(&self, token: &str) -> Result<bool, DomainError> {
        self.store.exists(&keys::blacklist_key(token)).await
    }
}
