//! Soft device binding derived from user-agent and network prefix

use std::net::IpAddr;

use ipnetwork::{Ipv4Network, Ipv6Network};
use tg_shared::config::SessionBindingConfig;
use tg_shared::utils::sha256_hex;

use crate::domain::entities::session::{DeviceSignal, SessionFingerprint};

/// Placeholder hashed when no user-agent was sent
const MISSING_USER_AGENT: &str = "-";
/// Prefix recorded when the peer address is unknown
const UNKNOWN_PREFIX: &str = "-";

/// Builds [`SessionFingerprint`]s
///
/// Only a network prefix is kept, so NAT rebinding and IPv6 privacy
/// addresses within one network still match.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    ipv4_prefix_len: u8,
    ipv6_prefix_len: u8,
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new(&SessionBindingConfig::default())
    }
}

impl FingerprintBuilder {
    pub fn new(config: &SessionBindingConfig) -> Self {
        Self {
            ipv4_prefix_len: config.ipv4_prefix_len.min(32),
            ipv6_prefix_len: config.ipv6_prefix_len.min(128),
        }
    }

    pub fn fingerprint(&self, device: &DeviceSignal) -> SessionFingerprint {
        let user_agent = device
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .unwrap_or(MISSING_USER_AGENT);

        SessionFingerprint {
            user_agent_hash: sha256_hex(user_agent.as_bytes()),
            ip_prefix: device
                .remote_addr
                .map(|ip| self.ip_prefix(&ip))
                .unwrap_or_else(|| UNKNOWN_PREFIX.to_string()),
        }
    }

    /// Network containing `ip`, in CIDR notation
    pub fn ip_prefix(&self, ip: &IpAddr) -> String {
        match ip {
            IpAddr::V6(ipv6) => match ipv6.to_ipv4_mapped() {
                Some(ipv4) => self.ipv4_prefix(ipv4),
                None => match Ipv6Network::new(*ipv6, self.ipv6_prefix_len) {
                    Ok(network) => {
                        format!("{}/{}", network.network(), self.ipv6_prefix_len)
                    }
                    Err(_) => ipv6.to_string(),
                },
            },
            IpAddr::V4(ipv4) => self.ipv4_prefix(*ipv4),
        }
    }

    fn ipv4_prefix(&self, ipv4: std::net::Ipv4Addr) -> String {
        match Ipv4Network::new(ipv4, self.ipv4_prefix_len) {
            Ok(network) => format!("{}/{}", network.network(), self.ipv4_prefix_len),
            Err(_) => ipv4.to_string(),
        }
    }
}
