//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token signing, refresh cookie, exchange codes and device binding
//! - `cache` - key-value store backend and Redis connection settings
//! - `environment` - environment detection and logging configuration
//!
//! Values are layered: defaults, then an optional config file, then
//! `TOLLGATE__SECTION__FIELD` environment variables.

pub mod auth;
pub mod cache;
pub mod environment;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{
    AuthConfig, ExchangeCodeConfig, JwtConfig, RefreshCookieConfig, SessionBindingConfig,
    DEVELOPMENT_SECRET,
};
pub use cache::{CacheConfig, CacheType};
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Prefix for layered environment overrides
pub const ENV_PREFIX: &str = "TOLLGATE";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Key-value store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            auth: AuthConfig {
                refresh_cookie: RefreshCookieConfig::development(),
                ..Default::default()
            },
            cache: CacheConfig::memory(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    ///
    /// The signing secret must still come from the environment; the
    /// development secret is rejected by [`AppConfig::validate`].
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from plain environment variables (`JWT_SECRET`,
    /// `REDIS_URL`, ...), reading the environment's `.env` file first.
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let _ = dotenvy::from_filename(env.env_file()).or_else(|_| dotenvy::dotenv());

        let mut config = match env {
            Environment::Production => Self::production(),
            _ => Self::development(),
        };
        config.environment = env;
        config.auth = AuthConfig::from_env_over(config.auth);
        config.cache = CacheConfig::from_env();
        config.logging = LoggingConfig::for_environment(env);
        config
    }

    /// Load layered configuration: optional file at `path`, then
    /// `TOLLGATE__*` environment overrides. The result is validated.
    pub fn load(path: &str) -> Result<Self, ConfigLoadError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Startup checks that must hold before any token is issued
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let jwt = &self.auth.jwt;

        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err(ConfigLoadError::Invalid(
                "development signing secret cannot be used in production".to_string(),
            ));
        }
        if jwt.access_token_ttl_secs <= 0 || jwt.refresh_token_ttl_secs <= 0 {
            return Err(ConfigLoadError::Invalid(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if jwt.issuer.trim().is_empty() || jwt.audience.trim().is_empty() {
            return Err(ConfigLoadError::Invalid(
                "issuer and audience must be set".to_string(),
            ));
        }
        if self.auth.exchange_code.max_issue_attempts == 0 {
            return Err(ConfigLoadError::Invalid(
                "exchange code attempts must be at least 1".to_string(),
            ));
        }
        if self.auth.refresh_cookie.same_site.eq_ignore_ascii_case("none")
            && !self.auth.refresh_cookie.secure
        {
            return Err(ConfigLoadError::Invalid(
                "SameSite=None requires a secure refresh cookie".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let config = AppConfig::development();
        assert!(config.environment.is_development());
        assert_eq!(config.cache.backend, CacheType::Memory);
        assert!(!config.auth.refresh_cookie.secure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_layering_keeps_development_cookie_profile() {
        // REFRESH_COOKIE_SECURE is unset in the test environment
        let auth = AuthConfig::from_env_over(AppConfig::development().auth);
        assert!(!auth.refresh_cookie.secure);

        let auth = AuthConfig::from_env_over(AppConfig::production().auth);
        assert!(auth.refresh_cookie.secure);
    }

    #[test]
    fn test_production_rejects_development_secret() {
        let config = AppConfig::production();
        assert!(matches!(config.validate(), Err(ConfigLoadError::Invalid(_))));

        let mut config = AppConfig::production();
        config.auth.jwt = JwtConfig::new("a-real-secret-of-at-least-32-bytes!!");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_ttl() {
        let mut config = AppConfig::development();
        config.auth.jwt.access_token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_site_none_requires_secure() {
        let mut config = AppConfig::development();
        config.auth.refresh_cookie.same_site = "None".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load("does-not-exist/tollgate").unwrap();
        assert_eq!(config.auth.jwt.issuer, "tollgate");
        assert_eq!(config.auth.exchange_code.default_ttl_secs, 60);
    }
}
