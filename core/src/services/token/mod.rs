//! Token codec module
//!
//! This module handles all token-related operations including:
//! - Access and refresh token signing (HS256 or RS256)
//! - Verification with issuer, audience, type and clock-skew checks
//! - Remaining-validity arithmetic for dependent TTLs
//! - Swapping the active signing key behind a shared handle

mod codec;
mod config;
mod handle;
mod key_manager;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use config::{parse_algorithm, TokenCodecConfig};
pub use handle::CodecHandle;
pub use key_manager::{SigningKeys, MIN_HMAC_KEY_BYTES};
