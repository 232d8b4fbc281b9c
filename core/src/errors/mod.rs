//! Domain-specific error types and error handling.

mod types;


pub use types::TokenError;

use thiserror::Error;
use tg_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A refresh session was already consumed, revoked or expired
    #[error("Refresh token reuse detected")]
    ReuseDetected,

    #[error("Exchange code not found or already consumed")]
    CodeNotFoundOrConsumed,

    #[error("Exchange code could not be allocated")]
    ExchangeCodeExhausted,

    /// The shared store could not answer; never treated as "absent"
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Signing key too weak: {bits} bits (256 required)")]
    WeakKeyConfigured { bits: usize },

    #[error("Key load error: {message}")]
    KeyLoad { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Failures that must surface as an opaque 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DomainError::Token(_) | DomainError::ReuseDetected)
    }

    /// Suggested HTTP status for transport layers
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Token(_) | DomainError::ReuseDetected => 401,
            DomainError::CodeNotFoundOrConsumed => 400,
            DomainError::StoreUnavailable { .. } => 503,
            _ => 500,
        }
    }

    /// Whether this error must abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::WeakKeyConfigured { .. }
                | DomainError::KeyLoad { .. }
                | DomainError::Configuration { .. }
        )
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::Token(_) | DomainError::ReuseDetected => ErrorResponse::unauthorized(),
            DomainError::CodeNotFoundOrConsumed => ErrorResponse::new(
                error_codes::BAD_REQUEST,
                "invalid or expired code",
                self.status_code(),
            ),
            DomainError::StoreUnavailable { .. } => ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "service temporarily unavailable",
                self.status_code(),
            ),
            DomainError::WeakKeyConfigured { .. }
            | DomainError::KeyLoad { .. }
            | DomainError::Configuration { .. } => ErrorResponse::new(
                error_codes::CONFIGURATION_ERROR,
                "server misconfigured",
                self.status_code(),
            ),
            DomainError::ExchangeCodeExhausted | DomainError::Internal { .. } => {
                ErrorResponse::new(
                    error_codes::INTERNAL_ERROR,
                    "internal error",
                    self.status_code(),
                )
            }
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
