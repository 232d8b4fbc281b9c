//! Signing and verification of access and refresh tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Header, Validation};
use tg_shared::config::JwtConfig;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, IssuedToken, RawClaims, TokenType};
use crate::errors::{DomainError, TokenError};
use crate::services::claims::ClaimsPolicy;

use super::config::TokenCodecConfig;
use super::key_manager::SigningKeys;

/// Stateless token codec: a pure function of one key and its configuration
///
/// Construction is the only place a weak key can be rejected; once a codec
/// exists every call is local and non-blocking.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    config: TokenCodecConfig,
    keys: SigningKeys,
    policy: ClaimsPolicy,
    validation: Validation,
    /// Signature, issuer and audience checks without `exp`
    lifetime_validation: Validation,
}

impl TokenCodec {
    /// Creates a codec from explicit configuration and keys
    ///
    /// # Errors
    ///
    /// * `Configuration` - the keys were built for another algorithm
    pub fn new(config: TokenCodecConfig, keys: SigningKeys) -> Result<Self, DomainError> {
        if keys.algorithm() != config.algorithm {
            return Err(DomainError::Configuration {
                message: format!(
                    "configured algorithm {:?} does not match key type {:?}",
                    config.algorithm,
                    keys.algorithm()
                ),
            });
        }

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = config.clock_skew_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let mut lifetime_validation = validation.clone();
        lifetime_validation.validate_exp = false;
        lifetime_validation.validate_nbf = false;

        tracing::info!(
            algorithm = ?config.algorithm,
            kid = %config.kid,
            key_bits = ?keys.bits(),
            key_fingerprint = %keys.fingerprint(),
            "Token codec initialized"
        );

        Ok(Self {
            config,
            keys,
            policy: ClaimsPolicy::new(),
            validation,
            lifetime_validation,
        })
    }

    /// Creates a codec from the shared JWT configuration
    ///
    /// A key under 256 bits aborts here with `WeakKeyConfigured`.
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        let keys = SigningKeys::from_jwt_config(config).map_err(|e| {
            if let DomainError::WeakKeyConfigured { bits } = &e {
                tracing::error!(
                    event = "weak_key_configured",
                    bits = *bits,
                    "Signing key shorter than 256 bits"
                );
            }
            e
        })?;
        Self::new(TokenCodecConfig::from_jwt_config(config)?, keys)
    }

    pub fn config(&self) -> &TokenCodecConfig {
        &self.config
    }

    pub fn policy(&self) -> &ClaimsPolicy {
        &self.policy
    }

    /// Default lifetime for a token type
    pub fn default_ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.config.access_ttl,
            TokenType::Refresh => self.config.refresh_ttl,
        }
    }

    /// Signs a token
    ///
    /// # Arguments
    ///
    /// * `subject` - `sub` claim; mirrored into `userId` when numeric
    /// * `roles` - normalized and hierarchy-expanded before signing
    /// * `token_type` - written to `typ`
    /// * `ttl` - lifetime, defaulting to the configured one for the type
    /// * `jti` - token id, a random UUID when `None`
    pub fn issue<S: AsRef<str>>(
        &self,
        subject: &str,
        roles: &[S],
        token_type: TokenType,
        ttl: Option<Duration>,
        jti: Option<String>,
    ) -> Result<IssuedToken, DomainError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(DomainError::Internal {
                message: "cannot issue a token without a subject".to_string(),
            });
        }

        let ttl = ttl.unwrap_or_else(|| self.default_ttl(token_type));
        if ttl <= Duration::zero() {
            return Err(DomainError::Internal {
                message: "token lifetime must be positive".to_string(),
            });
        }

        let now = Utc::now();
        let expires_at = now + ttl;
        let jti = jti
            .filter(|j| !j.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let roles = self.policy.roles_for_issue(roles);
        let authorities = self.policy.to_authorities(&roles);

        let claims = Claims {
            sub: subject.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            jti: Some(jti.clone()),
            typ: token_type,
            roles,
            authorities,
            user_id: subject.parse().ok(),
        };

        let mut header = Header::new(self.config.algorithm);
        header.kid = Some(self.config.kid.clone());

        let token = encode(&header, &claims, self.keys.encoding_key()).map_err(|e| {
            DomainError::Internal {
                message: format!("token signing failed: {}", e),
            }
        })?;

        Ok(IssuedToken {
            token,
            jti,
            token_type,
            expires_at: claims.expires_at(),
        })
    }

    /// Signs an access token for a numeric user id
    pub fn issue_access<S: AsRef<str>>(
        &self,
        user_id: i64,
        roles: &[S],
    ) -> Result<IssuedToken, DomainError> {
        self.issue(&user_id.to_string(), roles, TokenType::Access, None, None)
    }

    /// Signs a refresh token for a numeric user id
    pub fn issue_refresh<S: AsRef<str>>(
        &self,
        user_id: i64,
        roles: &[S],
    ) -> Result<IssuedToken, DomainError> {
        self.issue(&user_id.to_string(), roles, TokenType::Refresh, None, None)
    }

    /// Verifies signature, issuer, audience and lifetime
    ///
    /// The error names the failed check for logs; callers must not echo it
    /// to clients.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Malformed);
        }

        let data = decode::<RawClaims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| {
                let error = TokenError::from(e);
                tracing::debug!(reason = error.reason(), "Token verification failed");
                error
            })?;

        Claims::try_from(data.claims)
    }

    /// Verifies and additionally requires a token type
    pub fn verify_as(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if !claims.is_type(expected) {
            tracing::debug!(
                expected = %expected,
                actual = %claims.typ,
                "Token type mismatch"
            );
            return Err(TokenError::WrongType {
                expected,
                actual: claims.typ,
            });
        }
        Ok(claims)
    }

    /// Time left before `exp`
    ///
    /// Zero or negative when the token is expired, forged or unparseable.
    /// Used to size TTLs of records that must not outlive the token.
    pub fn remaining_validity(&self, token: &str) -> Duration {
        match self.expiry_millis(token) {
            Some(exp_ms) => Duration::milliseconds(exp_ms - Utc::now().timestamp_millis()),
            None => Duration::zero(),
        }
    }

    /// Time left before `verify` stops accepting the token
    ///
    /// Covers `exp` plus the clock-skew leeway. Records that must live as
    /// long as the token is accepted (blacklist entries, refresh sessions)
    /// are sized with this, not with [`Self::remaining_validity`]. Zero when
    /// the token is forged or unparseable.
    pub fn acceptance_window(&self, token: &str) -> Duration {
        match self.expiry_millis(token) {
            Some(exp_ms) => {
                // exp is checked at whole-second resolution
                let leeway_ms = (self.config.clock_skew_secs as i64 + 1).saturating_mul(1000);
                let window = exp_ms.saturating_add(leeway_ms) - Utc::now().timestamp_millis();
                Duration::milliseconds(window.max(0))
            }
            None => Duration::zero(),
        }
    }

    /// `exp` in epoch milliseconds for a token signed by this codec
    fn expiry_millis(&self, token: &str) -> Option<i64> {
        let token = token.trim();
        match decode::<RawClaims>(token, self.keys.decoding_key(), &self.lifetime_validation) {
            Ok(data) => Some(data.claims.exp.saturating_mul(1000)),
            Err(e) => {
                tracing::debug!(
                    reason = TokenError::from(e).reason(),
                    "Token lifetime unavailable"
                );
                None
            }
        }
    }
}
