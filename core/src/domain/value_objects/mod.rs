//! Value objects representing immutable domain concepts.

pub mod refresh_cookie;
pub mod token_response;


// Re-export commonly used types
pub use refresh_cookie::{parse_same_site, RefreshCookie, RequestOrigin, SameSite};
pub use token_response::TokenResponse;
