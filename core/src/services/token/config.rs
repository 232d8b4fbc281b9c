//! Configuration for the token codec

use chrono::Duration;
use jsonwebtoken::Algorithm;
use tg_shared::config::JwtConfig;

use crate::errors::DomainError;

/// Configuration for the token codec
#[derive(Debug, Clone)]
pub struct TokenCodecConfig {
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Tolerance applied to `exp` and `nbf`
    pub clock_skew_secs: u64,
    /// Key id stamped into the header
    pub kid: String,
    /// Signing algorithm
    pub algorithm: Algorithm,
}

impl Default for TokenCodecConfig {
    fn default() -> Self {
        Self {
            issuer: "tollgate".to_string(),
            audience: "frontend".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            clock_skew_secs: 60,
            kid: "hmac-1".to_string(),
            algorithm: Algorithm::HS256,
        }
    }
}

impl TokenCodecConfig {
    /// Build from the shared JWT configuration
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        if config.access_token_ttl_secs <= 0 || config.refresh_token_ttl_secs <= 0 {
            return Err(DomainError::Configuration {
                message: "token lifetimes must be positive".to_string(),
            });
        }

        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: Duration::seconds(config.access_token_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_secs),
            clock_skew_secs: config.clock_skew_secs,
            kid: config.kid.clone(),
            algorithm: parse_algorithm(&config.algorithm)?,
        })
    }
}

/// Only HS256 and RS256 are supported
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "RS256" => Ok(Algorithm::RS256),
        other => Err(DomainError::Configuration {
            message: format!("unsupported signing algorithm: {}", other),
        }),
    }
}
