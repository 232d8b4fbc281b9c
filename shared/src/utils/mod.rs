//! Common utility functions

pub mod masking;

pub use masking::{fingerprint, mask_url, sha256_hex};
