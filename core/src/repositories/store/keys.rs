//! Key namespaces. Each kind of record lives under its own prefix so a
//! per-user bulk delete can never touch another user's keys.

use tg_shared::utils::sha256_hex;

pub const BLACKLIST_PREFIX: &str = "blacklist:";
pub const REFRESH_SESSION_PREFIX: &str = "refreshsess:";
pub const EXCHANGE_CODE_PREFIX: &str = "otc:";

/// `blacklist:<sha256 hex of the raw token>`
pub fn blacklist_key(token: &str) -> String {
    format!("{}{}", BLACKLIST_PREFIX, sha256_hex(token.as_bytes()))
}

/// `refreshsess:<userId>:<jti>`
pub fn refresh_session_key(user_id: &str, jti: &str) -> String {
    format!("{}{}:{}", REFRESH_SESSION_PREFIX, user_id, jti)
}

/// `refreshsess:<userId>:`, the trailing colon keeps user 4 from matching user 42
pub fn refresh_session_user_prefix(user_id: &str) -> String {
    format!("{}{}:", REFRESH_SESSION_PREFIX, user_id)
}

/// `otc:<code>`
pub fn exchange_code_key(code: &str) -> String {
    format!("{}{}", EXCHANGE_CODE_PREFIX, code)
}
