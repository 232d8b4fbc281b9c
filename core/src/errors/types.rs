//! Token verification failures
//!
//! Each variant names the check that failed. The distinction is for logs and
//! tests only; at the boundary every variant collapses to one opaque
//! "unauthorized" response (see [`super::DomainError::to_error_response`]).

use thiserror::Error;

use crate::domain::entities::token::TokenType;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Issuer or audience mismatch")]
    IssuerOrAudienceMismatch,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongType { expected: TokenType, actual: TokenType },

    #[error("Unsupported token type")]
    UnsupportedType,

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },

    /// Valid signature but blacklisted before its expiry
    #[error("Token revoked")]
    Revoked,
}

impl TokenError {
    /// Short machine-readable reason, for structured log fields
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::IssuerOrAudienceMismatch => "issuer_or_audience_mismatch",
            TokenError::WrongType { .. } => "wrong_type",
            TokenError::UnsupportedType => "unsupported_type",
            TokenError::MissingClaim { .. } => "missing_claim",
            TokenError::Revoked => "revoked",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                TokenError::IssuerOrAudienceMismatch
            }
            ErrorKind::MissingRequiredClaim(claim) if claim == "iss" || claim == "aud" => {
                TokenError::IssuerOrAudienceMismatch
            }
            ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim {
                claim: claim.clone(),
            },
            _ => TokenError::Malformed,
        }
    }
}
