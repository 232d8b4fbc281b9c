//! Composition of codec, blacklist, session store and code broker

use std::sync::Arc;
use std::time::Duration;

use tg_shared::config::{AuthConfig, ExchangeCodeConfig, RefreshCookieConfig};
use tg_shared::logging::log_security_event;

use crate::domain::entities::session::{ConsumeOutcome, DeviceSignal};
use crate::domain::entities::token::{Claims, IssuedToken, TokenPair, TokenType};
use crate::domain::value_objects::{RefreshCookie, TokenResponse};
use crate::errors::{DomainError, TokenError};
use crate::repositories::store::KeyValueStore;
use crate::services::blacklist::BlacklistStore;
use crate::services::exchange::OneTimeCodeBroker;
use crate::services::session::RefreshSessionStore;
use crate::services::token::CodecHandle;

/// Role used when login supplies none
pub const DEFAULT_ROLE: &str = "USER";

/// Exchange code TTL cap when the refresh token's lifetime is unknown
const UNKNOWN_VALIDITY_CAP_SECS: i64 = 60;

/// Output of login and rotation
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
    /// `Set-Cookie` descriptor carrying `refresh`
    pub cookie: RefreshCookie,
}

impl IssuedSession {
    /// Access-only body; the refresh token travels in `cookie`
    pub fn token_response(&self) -> TokenResponse {
        TokenResponse::new(self.access.token.clone(), self.access.expires_in())
    }

    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.access.token.clone(), self.refresh.token.clone())
    }
}

/// Entry point for every session lifecycle operation
///
/// Holds no mutable state of its own. Cross-request coordination happens in
/// the shared store through atomic consume and get-and-delete.
#[derive(Clone)]
pub struct SessionOrchestrator {
    codec: CodecHandle,
    blacklist: BlacklistStore,
    sessions: RefreshSessionStore,
    codes: OneTimeCodeBroker,
    cookie_config: RefreshCookieConfig,
    exchange_config: ExchangeCodeConfig,
}

impl SessionOrchestrator {
    pub fn new(codec: CodecHandle, store: Arc<dyn KeyValueStore>, config: &AuthConfig) -> Self {
        Self {
            blacklist: BlacklistStore::new(store.clone(), codec.clone()),
            sessions: RefreshSessionStore::new(store.clone(), &config.session_binding),
            codes: OneTimeCodeBroker::new(store, &config.exchange_code),
            codec,
            cookie_config: config.refresh_cookie.clone(),
            exchange_config: config.exchange_code.clone(),
        }
    }

    pub fn codec(&self) -> &CodecHandle {
        &self.codec
    }

    pub fn blacklist(&self) -> &BlacklistStore {
        &self.blacklist
    }

    pub fn sessions(&self) -> &RefreshSessionStore {
        &self.sessions
    }

    /// Issue a fresh token pair after the caller authenticated `user_id`
    pub async fn issue_login_tokens(
        &self,
        user_id: i64,
        role: &str,
        device: &DeviceSignal,
        cross_site: bool,
    ) -> Result<IssuedSession, DomainError> {
        let role = if role.trim().is_empty() {
            DEFAULT_ROLE
        } else {
            role
        };
        let session = self
            .issue_session(&user_id.to_string(), &[role], device, cross_site)
            .await?;

        tracing::info!(
            user_id,
            jti = %session.refresh.jti,
            role = %role,
            "Login tokens issued"
        );
        Ok(session)
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented session is consumed atomically. A session that is
    /// missing or bound to another device means the token was replayed:
    /// every session of the user is revoked and `ReuseDetected` returned.
    /// A store outage propagates as `StoreUnavailable` and revokes nothing.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        device: &DeviceSignal,
        cross_site: bool,
    ) -> Result<IssuedSession, DomainError> {
        let claims = self
            .codec
            .current()
            .verify_as(refresh_token, TokenType::Refresh)?;
        let jti = claims.require_jti()?.to_string();
        let user_id = claims.sub.clone();

        match self.sessions.consume(&user_id, &jti, device).await? {
            ConsumeOutcome::Consumed => {}
            outcome => {
                let revoked = self.sessions.revoke_all(&user_id).await?;
                tracing::info!(
                    user_id = %user_id,
                    jti = %jti,
                    outcome = ?outcome,
                    revoked,
                    "Refresh session not consumable"
                );
                log_security_event(
                    "refresh_reuse_detected",
                    Some(user_id.as_str()),
                    "refresh token reuse detected, all sessions revoked",
                );
                return Err(DomainError::ReuseDetected);
            }
        }

        let roles = if claims.roles.is_empty() {
            vec![DEFAULT_ROLE.to_string()]
        } else {
            claims.roles.clone()
        };
        let session = self
            .issue_session(&user_id, &roles, device, cross_site)
            .await?;

        tracing::info!(
            user_id = %user_id,
            previous_jti = %jti,
            jti = %session.refresh.jti,
            "Refresh token rotated"
        );
        Ok(session)
    }

    /// End a session
    ///
    /// Blacklists `access_token` when given, then revokes the refresh
    /// session it names, or every session of the user when `revoke_all` is
    /// set. An unparseable refresh token is skipped; with `revoke_all` the
    /// subject of a valid access token is used instead. Returns the cookie
    /// that clears the refresh token on the client.
    pub async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        revoke_all: bool,
    ) -> Result<RefreshCookie, DomainError> {
        let codec = self.codec.current();
        let access_token = access_token.map(str::trim).filter(|t| !t.is_empty());
        let refresh_token = refresh_token.map(str::trim).filter(|t| !t.is_empty());

        if let Some(access) = access_token {
            self.blacklist.add(access).await?;
        }

        let refresh_claims = refresh_token.and_then(|token| {
            codec
                .verify_as(token, TokenType::Refresh)
                .map_err(|e| {
                    tracing::debug!(reason = e.reason(), "Logout refresh token unusable");
                })
                .ok()
        });

        match (refresh_claims, revoke_all) {
            (Some(claims), false) => {
                if let Some(jti) = claims.jti.as_deref() {
                    self.sessions.revoke(&claims.sub, jti).await?;
                }
            }
            (Some(claims), true) => {
                self.sessions.revoke_all(&claims.sub).await?;
            }
            (None, true) => {
                let subject = access_token
                    .and_then(|token| codec.verify_as(token, TokenType::Access).ok())
                    .map(|claims| claims.sub);
                match subject {
                    Some(user_id) => {
                        self.sessions.revoke_all(&user_id).await?;
                    }
                    None => tracing::debug!("Logout everywhere without an identifiable user"),
                }
            }
            (None, false) => {}
        }

        tracing::info!(revoke_all, "Logout completed");
        Ok(RefreshCookie::deletion(&self.cookie_config))
    }

    /// Park a token pair behind a one-time code
    ///
    /// `ttl_secs <= 0` selects the configured default. The TTL never
    /// outlives the refresh token; when its remaining validity cannot be
    /// read the TTL is capped at 60 seconds.
    pub async fn issue_exchange_code(
        &self,
        access_token: &str,
        refresh_token: &str,
        ttl_secs: i64,
    ) -> Result<String, DomainError> {
        let requested = if ttl_secs <= 0 {
            self.exchange_config.default_ttl_secs.max(1)
        } else {
            ttl_secs
        };

        let remaining_secs = self
            .codec
            .current()
            .remaining_validity(refresh_token)
            .num_seconds();
        let ttl_secs = if remaining_secs > 0 {
            requested.min(remaining_secs.max(1))
        } else {
            requested.min(UNKNOWN_VALIDITY_CAP_SECS)
        };

        let payload = TokenPair::new(access_token, refresh_token);
        self.codes
            .issue(&payload, Duration::from_secs(ttl_secs as u64))
            .await
    }

    /// Redeem a code once
    pub async fn redeem_exchange_code(&self, code: &str) -> Result<TokenPair, DomainError> {
        self.codes.redeem(code).await
    }

    /// Body and cookie handed to a client that redeemed `pair`
    pub fn exchange_response(
        &self,
        pair: &TokenPair,
        cross_site: bool,
    ) -> (TokenResponse, RefreshCookie) {
        let codec = self.codec.current();
        let access_secs = codec.remaining_validity(&pair.access_token).num_seconds();
        let refresh_secs = codec.remaining_validity(&pair.refresh_token).num_seconds();
        (
            TokenResponse::new(pair.access_token.clone(), access_secs),
            RefreshCookie::issue(
                &self.cookie_config,
                pair.refresh_token.clone(),
                refresh_secs,
                cross_site,
            ),
        )
    }

    pub async fn is_blacklisted(&self, access_token: &str) -> Result<bool, DomainError> {
        self.blacklist.contains(access_token).await
    }

    /// Authenticate a request: blacklist first, then access token checks
    pub async fn authenticate(&self, access_token: &str) -> Result<Claims, DomainError> {
        if self.blacklist.contains(access_token).await? {
            tracing::warn!(
                event = "blacklisted_token_presented",
                "Blacklisted access token presented"
            );
            return Err(TokenError::Revoked.into());
        }
        Ok(self
            .codec
            .current()
            .verify_as(access_token, TokenType::Access)?)
    }

    async fn issue_session<S: AsRef<str>>(
        &self,
        user_id: &str,
        roles: &[S],
        device: &DeviceSignal,
        cross_site: bool,
    ) -> Result<IssuedSession, DomainError> {
        let codec = self.codec.current();
        let access = codec.issue(user_id, roles, TokenType::Access, None, None)?;
        let refresh = codec.issue(user_id, roles, TokenType::Refresh, None, None)?;

        // the record must outlive every instant `verify` still accepts the token
        let ttl = codec
            .acceptance_window(&refresh.token)
            .to_std()
            .unwrap_or_default();
        self.sessions.save(user_id, &refresh.jti, device, ttl).await?;

        let cookie = RefreshCookie::issue(
            &self.cookie_config,
            refresh.token.clone(),
            refresh.expires_in(),
            cross_site,
        );

        Ok(IssuedSession {
            access,
            refresh,
            cookie,
        })
    }
}
