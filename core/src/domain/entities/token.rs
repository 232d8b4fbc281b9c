//! Token entities for JWT-based authentication.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

/// Prefix carried by every entry of the `authorities` claim
pub const ROLE_PREFIX: &str = "ROLE_";

/// Token type, carried in the `typ` claim
///
/// The wire values are `acc` and `ref`; `access` and `refresh` are accepted
/// on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "acc", alias = "access")]
    Access,
    #[serde(rename = "ref", alias = "refresh")]
    Refresh,
}

impl TokenType {
    /// Value written to the `typ` claim
    pub fn claim_value(&self) -> &'static str {
        match self {
            TokenType::Access => "acc",
            TokenType::Refresh => "ref",
        }
    }

    /// Parse a `typ` claim value
    pub fn from_claim(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "acc" | "access" => Some(TokenType::Access),
            "ref" | "refresh" => Some(TokenType::Refresh),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// A claim that upstream issuers send either as a JSON array or as one
/// space/comma-delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimList {
    Many(Vec<String>),
    One(String),
}

impl ClaimList {
    /// Flatten into trimmed, non-empty entries
    pub fn into_values(self) -> Vec<String> {
        match self {
            ClaimList::Many(values) => values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
            ClaimList::One(value) => value
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for ClaimList {
    fn default() -> Self {
        ClaimList::Many(Vec::new())
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    /// Subject (user ID in string form)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// JWT ID; always present on refresh tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Token type
    pub typ: TokenType,

    /// Canonical role names, hierarchy already expanded
    pub roles: Vec<String>,

    /// `ROLE_`-prefixed mirror of `roles`
    pub authorities: Vec<String>,

    /// Numeric user id mirroring `sub`
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Claims {
    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token type matches
    pub fn is_type(&self, expected: TokenType) -> bool {
        self.typ == expected
    }

    /// Subject parsed as a numeric user id
    pub fn numeric_user_id(&self) -> Option<i64> {
        self.user_id.or_else(|| self.sub.parse().ok())
    }

    /// The `jti`, or `MissingClaim` when absent
    pub fn require_jti(&self) -> Result<&str, TokenError> {
        self.jti
            .as_deref()
            .filter(|jti| !jti.is_empty())
            .ok_or_else(|| TokenError::MissingClaim {
                claim: "jti".to_string(),
            })
    }

    /// Whether the role set contains `role` (canonical name, no prefix)
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Claims as they arrive on the wire, before type and shape checks
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    pub sub: Option<String>,
    pub iss: Option<String>,
    pub aud: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub nbf: i64,
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub roles: ClaimList,
    #[serde(default)]
    pub authorities: ClaimList,
    #[serde(default, rename = "userId", alias = "user_id")]
    pub user_id: Option<i64>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let typ = raw
            .typ
            .as_deref()
            .and_then(TokenType::from_claim)
            .ok_or(TokenError::UnsupportedType)?;

        let sub = raw
            .sub
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| TokenError::MissingClaim {
                claim: "sub".to_string(),
            })?;

        Ok(Self {
            sub,
            iss: raw.iss.unwrap_or_default(),
            aud: raw.aud.unwrap_or_default(),
            iat: raw.iat,
            exp: raw.exp,
            nbf: raw.nbf,
            jti: raw.jti.filter(|j| !j.is_empty()),
            typ,
            roles: raw.roles.into_values(),
            authorities: raw.authorities.into_values(),
            user_id: raw.user_id,
        })
    }
}

/// A freshly signed token and the facts callers need about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact serialized token
    pub token: String,
    /// Token id written to the `jti` claim
    pub jti: String,
    /// Token type
    pub token_type: TokenType,
    /// Expiration instant
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds until expiry, never negative
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// Access and refresh token pair, the payload of an exchange code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}
