//! Header helpers for transport layers

const BEARER_PREFIX: &str = "bearer ";

/// Token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively. Returns `None` for other
/// schemes or an empty token.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let header = header.trim_start();
    let scheme = header.get(..BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = header[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
