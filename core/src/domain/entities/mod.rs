//! Domain entities representing core business objects.

pub mod session;
pub mod token;

// Re-export commonly used types
pub use session::{ConsumeOutcome, DeviceSignal, RefreshSession, SessionFingerprint};
pub use token::{ClaimList, Claims, IssuedToken, TokenPair, TokenType, ROLE_PREFIX};
