//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error body handed to transport layers
///
/// Authentication failures always carry the same opaque message so callers
/// cannot tell an expired token from a forged or revoked one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// One of [`error_codes`]
    pub error: String,

    /// Safe to show to clients; never names the failed check
    pub message: String,

    /// Suggested HTTP status
    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Opaque 401 response
    pub fn unauthorized() -> Self {
        Self::new(error_codes::UNAUTHORIZED, "unauthorized", 401)
    }

    /// Attach a detail field; values that fail to serialize are dropped
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Machine-readable codes carried in [`ErrorResponse::error`]
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
}

/// Conversion of a domain error into the body a transport layer returns
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}
