//! # Tollgate Core
//!
//! Token and session lifecycle for the Tollgate backend: signing and
//! verification of access/refresh tokens, single-use refresh rotation with
//! reuse detection, the access-token blacklist and one-time exchange codes.
//! All shared state lives behind the [`KeyValueStore`] trait.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, ConsumeOutcome, DeviceSignal, IssuedToken, TokenPair, TokenType,
};
pub use domain::value_objects::{RefreshCookie, RequestOrigin, SameSite, TokenResponse};
pub use errors::{DomainError, DomainResult, TokenError};
pub use repositories::{InMemoryStore, KeyValueStore};
pub use services::{
    extract_bearer, BlacklistStore, ClaimsPolicy, CodecHandle, IssuedSession, OneTimeCodeBroker,
    RefreshSessionStore, SessionOrchestrator, SigningKeys, TokenCodec, TokenCodecConfig,
};
