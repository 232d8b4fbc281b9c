//! Exchange code issuance and atomic redemption

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use tg_shared::config::ExchangeCodeConfig;
use tg_shared::utils::fingerprint;

use crate::domain::entities::token::TokenPair;
use crate::errors::DomainError;
use crate::repositories::store::{keys, KeyValueStore};

/// Lower bound on code entropy
pub const MIN_CODE_BYTES: usize = 32;

/// Issues and redeems exchange codes stored under `otc:<code>`
#[derive(Clone)]
pub struct OneTimeCodeBroker {
    store: Arc<dyn KeyValueStore>,
    code_bytes: usize,
    max_attempts: u32,
}

impl OneTimeCodeBroker {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &ExchangeCodeConfig) -> Self {
        Self {
            store,
            code_bytes: config.code_bytes.max(MIN_CODE_BYTES),
            max_attempts: config.max_issue_attempts.max(1),
        }
    }

    fn generate_code(&self) -> String {
        let mut bytes = vec![0u8; self.code_bytes];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Store `payload` under a fresh code for `ttl`
    ///
    /// # Errors
    ///
    /// * `ExchangeCodeExhausted` - every attempt collided with a live code
    /// * `StoreUnavailable` - the store could not be reached
    pub async fn issue(&self, payload: &TokenPair, ttl: Duration) -> Result<String, DomainError> {
        if ttl.is_zero() {
            return Err(DomainError::Internal {
                message: "exchange code ttl must be positive".to_string(),
            });
        }

        let value = serde_json::to_string(payload).map_err(|e| DomainError::Internal {
            message: format!("failed to encode exchange payload: {}", e),
        })?;

        for attempt in 1..=self.max_attempts {
            let code = self.generate_code();
            if self
                .store
                .set_if_absent(&keys::exchange_code_key(&code), &value, ttl)
                .await?
            {
                tracing::debug!(
                    code = %fingerprint(code.as_bytes()),
                    ttl_secs = ttl.as_secs(),
                    attempt,
                    "Exchange code issued"
                );
                return Ok(code);
            }
            tracing::warn!(attempt, "Exchange code collision, retrying");
        }

        tracing::error!(
            attempts = self.max_attempts,
            "Could not allocate a unique exchange code"
        );
        Err(DomainError::ExchangeCodeExhausted)
    }

    /// Atomically read and delete the payload behind `code`
    ///
    /// Exactly one of any number of concurrent redeemers receives the pair.
    pub async fn redeem(&self, code: &str) -> Result<TokenPair, DomainError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DomainError::CodeNotFoundOrConsumed);
        }

        let value = self
            .store
            .get_and_delete(&keys::exchange_code_key(code))
            .await?
            .filter(|v| !v.trim().is_empty())
            .ok_or(DomainError::CodeNotFoundOrConsumed)?;

        serde_json::from_str::<TokenPair>(&value).map_err(|e| {
            tracing::warn!(
                code = %fingerprint(code.as_bytes()),
                error = %e,
                "Exchange payload could not be decoded"
            );
            DomainError::CodeNotFoundOrConsumed
        })
    }
}
