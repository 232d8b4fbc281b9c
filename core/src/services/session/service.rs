//! Refresh session persistence with atomic single-use consumption

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use constant_time_eq::constant_time_eq;
use tg_shared::config::SessionBindingConfig;

use crate::domain::entities::session::{ConsumeOutcome, DeviceSignal, RefreshSession};
use crate::errors::DomainError;
use crate::repositories::store::{keys, KeyValueStore};

use super::fingerprint::FingerprintBuilder;

/// Stores one record per `(userId, jti)` under `refreshsess:<uid>:<jti>`
///
/// Single use comes from the store's atomic get-and-delete. The device
/// fingerprint is a soft signal layered on top.
#[derive(Clone)]
pub struct RefreshSessionStore {
    store: Arc<dyn KeyValueStore>,
    fingerprints: FingerprintBuilder,
    enforce_user_agent: bool,
}

impl RefreshSessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &SessionBindingConfig) -> Self {
        Self {
            store,
            fingerprints: FingerprintBuilder::new(config),
            enforce_user_agent: config.enforce_user_agent,
        }
    }

    /// Record a freshly issued refresh token; overwrites any existing record
    pub async fn save(
        &self,
        user_id: &str,
        jti: &str,
        device: &DeviceSignal,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(ttl).map_err(|e| DomainError::Internal {
                message: format!("session ttl out of range: {}", e),
            })?;
        let session = RefreshSession::new(self.fingerprints.fingerprint(device), expires_at);

        self.store
            .set_with_ttl(&keys::refresh_session_key(user_id, jti), &session.encode(), ttl)
            .await?;

        tracing::debug!(
            user_id = user_id,
            jti = jti,
            ttl_ms = ttl.as_millis() as u64,
            "Refresh session saved"
        );
        Ok(())
    }

    /// Atomically take the record and check its binding
    ///
    /// The record is gone afterwards whatever the outcome. Under concurrent
    /// calls for one `(user_id, jti)` at most one sees `Consumed`.
    pub async fn consume(
        &self,
        user_id: &str,
        jti: &str,
        device: &DeviceSignal,
    ) -> Result<ConsumeOutcome, DomainError> {
        let stored = match self
            .store
            .get_and_delete(&keys::refresh_session_key(user_id, jti))
            .await?
        {
            Some(value) => value,
            None => return Ok(ConsumeOutcome::Missing),
        };

        let session = match RefreshSession::decode(&stored) {
            Some(session) => session,
            None => {
                tracing::warn!(
                    event = "fingerprint_mismatch",
                    user_id = user_id,
                    jti = jti,
                    "Undecodable refresh session record"
                );
                return Ok(ConsumeOutcome::FingerprintMismatch);
            }
        };

        let presented = self.fingerprints.fingerprint(device);

        if session.fingerprint.ip_prefix != presented.ip_prefix {
            tracing::info!(
                user_id = user_id,
                jti = jti,
                "Refresh session used from a different network"
            );
        }

        let user_agent_matches = constant_time_eq(
            session.fingerprint.user_agent_hash.as_bytes(),
            presented.user_agent_hash.as_bytes(),
        );
        if !user_agent_matches {
            tracing::warn!(
                event = "fingerprint_mismatch",
                user_id = user_id,
                jti = jti,
                enforced = self.enforce_user_agent,
                "Refresh session user-agent mismatch"
            );
            if self.enforce_user_agent {
                return Ok(ConsumeOutcome::FingerprintMismatch);
            }
        }

        Ok(ConsumeOutcome::Consumed)
    }

    /// `consume` collapsed to a boolean
    pub async fn consume_if_match(
        &self,
        user_id: &str,
        jti: &str,
        device: &DeviceSignal,
    ) -> Result<bool, DomainError> {
        Ok(self.consume(user_id, jti, device).await?.is_consumed())
    }

    /// Delete one record; missing records are fine
    pub async fn revoke(&self, user_id: &str, jti: &str) -> Result<bool, DomainError> {
        let removed = self
            .store
            .delete(&keys::refresh_session_key(user_id, jti))
            .await?;
        tracing::debug!(user_id = user_id, jti = jti, removed, "Refresh session revoked");
        Ok(removed)
    }

    /// Delete every record of one user
    pub async fn revoke_all(&self, user_id: &str) -> Result<usize, DomainError> {
        let removed = self
            .store
            .delete_by_prefix(&keys::refresh_session_user_prefix(user_id))
            .await?;
        tracing::info!(user_id = user_id, removed, "All refresh sessions revoked");
        Ok(removed)
    }
}
