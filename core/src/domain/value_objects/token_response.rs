//! Response body for rotation and code redemption.

use serde::{Deserialize, Serialize};

/// Access-only token response; the refresh token travels in the cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn new(access_token: impl Into<String>, expires_in: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: expires_in.max(0),
        }
    }
}
