//! Helpers for keeping secrets out of logs and store keys

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `input`
pub fn sha256_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Short, stable handle for a secret: first 16 hex chars of its SHA-256
pub fn fingerprint(input: &[u8]) -> String {
    let mut digest = sha256_hex(input);
    digest.truncate(16);
    digest
}

/// Mask the password in a connection URL
pub fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.find(':') {
                Some(colon) => format!(
                    "{}{}:****{}",
                    &url[..scheme_end + 3],
                    &credentials[..colon],
                    &url[at..]
                ),
                None => format!("{}****{}", &url[..scheme_end + 3], &url[at..]),
            }
        }
        _ => url.to_string(),
    }
}
