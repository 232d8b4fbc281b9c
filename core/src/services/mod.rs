//! Business services containing the token and session lifecycle logic.

pub mod blacklist;
pub mod claims;
pub mod exchange;
pub mod orchestrator;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use blacklist::BlacklistStore;
pub use claims::{ClaimsPolicy, UpstreamPrincipal};
pub use exchange::OneTimeCodeBroker;
pub use orchestrator::{extract_bearer, IssuedSession, SessionOrchestrator};
pub use session::{FingerprintBuilder, RefreshSessionStore};
pub use token::{CodecHandle, SigningKeys, TokenCodec, TokenCodecConfig};
