//! Token signing, refresh-cookie, exchange-code and device-binding configuration

use serde::{Deserialize, Serialize};

/// Secret shipped for local development only; refused in production.
pub const DEVELOPMENT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing and verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// HMAC secret (HS256). Ignored for RS256.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Decode `secret` as standard Base64 instead of using its UTF-8 bytes
    #[serde(default)]
    pub secret_is_base64: bool,

    /// `iss` claim stamped on issue and required on verify
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// `aud` claim stamped on issue and required on verify
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,

    /// Allowed clock skew when checking `exp`/`nbf`
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: u64,

    /// Key id written to the token header
    #[serde(default = "default_kid")]
    pub kid: String,

    /// Signing algorithm: "HS256" or "RS256"
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// PEM private key path (RS256)
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// PEM public key path (RS256)
    #[serde(default)]
    pub public_key_path: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            secret_is_base64: false,
            issuer: default_issuer(),
            audience: default_audience(),
            access_token_ttl_secs: default_access_ttl(),
            refresh_token_ttl_secs: default_refresh_ttl(),
            clock_skew_secs: default_clock_skew(),
            kid: default_kid(),
            algorithm: default_algorithm(),
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_token_ttl_secs = minutes * 60;
        self
    }

    /// Set refresh token lifetime in days
    pub fn with_refresh_ttl_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl_secs = days * 86400;
        self
    }

    /// Check if using the development secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEVELOPMENT_SECRET
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            secret_is_base64: env_parse("JWT_SECRET_IS_BASE64", defaults.secret_is_base64),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_ttl_secs: env_parse("JWT_ACCESS_TOKEN_TTL", defaults.access_token_ttl_secs),
            refresh_token_ttl_secs: env_parse("JWT_REFRESH_TOKEN_TTL", defaults.refresh_token_ttl_secs),
            clock_skew_secs: env_parse("JWT_CLOCK_SKEW_SECONDS", defaults.clock_skew_secs),
            kid: std::env::var("JWT_KID").unwrap_or(defaults.kid),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
        }
    }
}

/// Refresh cookie attributes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshCookieConfig {
    /// Cookie name
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Path scope; must cover the refresh and logout endpoints only
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// SameSite attribute used for same-site requests
    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Secure flag (HTTPS only)
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Optional Domain attribute
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for RefreshCookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            same_site: default_same_site(),
            secure: default_secure(),
            domain: None,
        }
    }
}

impl RefreshCookieConfig {
    /// Cookie settings for local development over plain HTTP
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Default::default()
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_env_over(Self::default())
    }

    /// Environment variables layered over `defaults`
    pub fn from_env_over(defaults: Self) -> Self {
        Self {
            name: std::env::var("REFRESH_COOKIE_NAME").unwrap_or(defaults.name),
            path: std::env::var("REFRESH_COOKIE_PATH").unwrap_or(defaults.path),
            same_site: std::env::var("REFRESH_COOKIE_SAME_SITE").unwrap_or(defaults.same_site),
            secure: env_parse("REFRESH_COOKIE_SECURE", defaults.secure),
            domain: std::env::var("REFRESH_COOKIE_DOMAIN")
                .ok()
                .filter(|d| !d.trim().is_empty())
                .or(defaults.domain),
        }
    }
}

/// One-time exchange code settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeCodeConfig {
    /// TTL used when the caller asks for zero or a negative TTL
    #[serde(default = "default_code_ttl")]
    pub default_ttl_secs: i64,

    /// Create-if-absent attempts before giving up
    #[serde(default = "default_code_attempts")]
    pub max_issue_attempts: u32,

    /// Random bytes per code (clamped to at least 32)
    #[serde(default = "default_code_bytes")]
    pub code_bytes: usize,
}

impl Default for ExchangeCodeConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_code_ttl(),
            max_issue_attempts: default_code_attempts(),
            code_bytes: default_code_bytes(),
        }
    }
}

/// Soft device binding for refresh sessions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionBindingConfig {
    /// IPv4 prefix length kept in the session record
    #[serde(default = "default_ipv4_prefix")]
    pub ipv4_prefix_len: u8,

    /// IPv6 prefix length kept in the session record
    #[serde(default = "default_ipv6_prefix")]
    pub ipv6_prefix_len: u8,

    /// Reject a rotation whose user-agent hash differs from the stored one
    #[serde(default = "default_enforce_ua")]
    pub enforce_user_agent: bool,
}

impl Default for SessionBindingConfig {
    fn default() -> Self {
        Self {
            ipv4_prefix_len: default_ipv4_prefix(),
            ipv6_prefix_len: default_ipv6_prefix(),
            enforce_user_agent: default_enforce_ua(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Refresh cookie configuration
    #[serde(default)]
    pub refresh_cookie: RefreshCookieConfig,

    /// Exchange code configuration
    #[serde(default)]
    pub exchange_code: ExchangeCodeConfig,

    /// Device binding configuration
    #[serde(default)]
    pub session_binding: SessionBindingConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_env_over(Self::default())
    }

    /// Environment variables layered over `profile`; unset variables keep
    /// the profile's values
    pub fn from_env_over(profile: Self) -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            refresh_cookie: RefreshCookieConfig::from_env_over(profile.refresh_cookie),
            exchange_code: ExchangeCodeConfig {
                default_ttl_secs: env_parse(
                    "EXCHANGE_CODE_TTL",
                    profile.exchange_code.default_ttl_secs,
                ),
                ..profile.exchange_code
            },
            session_binding: profile.session_binding,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}

fn default_secret() -> String {
    String::from(DEVELOPMENT_SECRET)
}

fn default_issuer() -> String {
    String::from("tollgate")
}

fn default_audience() -> String {
    String::from("frontend")
}

fn default_access_ttl() -> i64 {
    900 // 15 minutes
}

fn default_refresh_ttl() -> i64 {
    604800 // 7 days
}

fn default_clock_skew() -> u64 {
    60
}

fn default_kid() -> String {
    String::from("hmac-1")
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_cookie_name() -> String {
    String::from("refresh_token")
}

fn default_cookie_path() -> String {
    String::from("/api/auth/")
}

fn default_same_site() -> String {
    String::from("Lax")
}

fn default_secure() -> bool {
    true
}

fn default_code_ttl() -> i64 {
    60
}

fn default_code_attempts() -> u32 {
    5
}

fn default_code_bytes() -> usize {
    32
}

fn default_ipv4_prefix() -> u8 {
    24
}

fn default_ipv6_prefix() -> u8 {
    64
}

fn default_enforce_ua() -> bool {
    true
}
