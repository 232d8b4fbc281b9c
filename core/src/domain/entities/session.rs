//! Refresh session records and the device signal they are bound to.

use std::net::IpAddr;

use chrono::{DateTime, TimeZone, Utc};

/// Per-request device information supplied by the transport layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSignal {
    /// Raw `User-Agent` header value
    pub user_agent: Option<String>,
    /// Remote peer address
    pub remote_addr: Option<IpAddr>,
}

impl DeviceSignal {
    pub fn new(user_agent: Option<&str>, remote_addr: Option<IpAddr>) -> Self {
        Self {
            user_agent: user_agent.map(str::to_string),
            remote_addr,
        }
    }
}

/// Soft device binding: user-agent hash plus a coarse network prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFingerprint {
    /// Hex SHA-256 of the user-agent (`-` when absent)
    pub user_agent_hash: String,
    /// Network prefix in CIDR form, e.g. `203.0.113.0/24`
    pub ip_prefix: String,
}

/// Stored value of a `refreshsess:<uid>:<jti>` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub fingerprint: SessionFingerprint,
    pub expires_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn new(fingerprint: SessionFingerprint, expires_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint,
            expires_at,
        }
    }

    /// Store encoding: `uaHash|ipPrefix|expiresAtEpochSecs`
    pub fn encode(&self) -> String {
        format!(
            "{}|{}|{}",
            self.fingerprint.user_agent_hash,
            self.fingerprint.ip_prefix,
            self.expires_at.timestamp()
        )
    }

    /// Decode a stored value. Missing trailing fields are tolerated so that
    /// `uaHash|ipPrefix` records still decode.
    pub fn decode(value: &str) -> Option<Self> {
        let mut parts = value.splitn(3, '|');
        let user_agent_hash = parts.next().filter(|p| !p.is_empty())?.to_string();
        let ip_prefix = parts.next().unwrap_or_default().to_string();
        let expires_at = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Some(Self {
            fingerprint: SessionFingerprint {
                user_agent_hash,
                ip_prefix,
            },
            expires_at,
        })
    }
}

/// Result of an atomic consume attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Record existed, matched and is now gone
    Consumed,
    /// No record: already used, revoked or expired
    Missing,
    /// Record existed but the device binding did not match; it is gone too
    FingerprintMismatch,
}

impl ConsumeOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(self, ConsumeOutcome::Consumed)
    }
}
