//! Tests for device fingerprinting

use std::net::IpAddr;

use tg_shared::config::SessionBindingConfig;

use crate::domain::entities::session::DeviceSignal;
use crate::services::session::FingerprintBuilder;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_ipv4_prefix() {
    let builder = FingerprintBuilder::default();
    assert_eq!(builder.ip_prefix(&ip("203.0.113.77")), "203.0.113.0/24");
}

#[test]
fn test_ipv6_prefix() {
    let builder = FingerprintBuilder::default();
    assert_eq!(
        builder.ip_prefix(&ip("2001:db8:abcd:12:1:2:3:4")),
        "2001:db8:abcd:12::/64"
    );
}

#[test]
fn test_ipv4_mapped_ipv6_uses_ipv4_prefix() {
    let builder = FingerprintBuilder::default();
    assert_eq!(builder.ip_prefix(&ip("::ffff:198.51.100.9")), "198.51.100.0/24");
}

#[test]
fn test_custom_prefix_lengths() {
    let builder = FingerprintBuilder::new(&SessionBindingConfig {
        ipv4_prefix_len: 16,
        ipv6_prefix_len: 48,
        enforce_user_agent: true,
    });
    assert_eq!(builder.ip_prefix(&ip("10.20.30.40")), "10.20.0.0/16");
    assert_eq!(builder.ip_prefix(&ip("2001:db8:1:2::1")), "2001:db8:1::/48");
}

#[test]
fn test_same_network_same_fingerprint() {
    let builder = FingerprintBuilder::default();
    let a = builder.fingerprint(&DeviceSignal::new(Some("Firefox"), Some(ip("10.0.0.1"))));
    let b = builder.fingerprint(&DeviceSignal::new(Some("Firefox"), Some(ip("10.0.0.200"))));
    assert_eq!(a, b);
}

#[test]
fn test_user_agent_changes_hash() {
    let builder = FingerprintBuilder::default();
    let a = builder.fingerprint(&DeviceSignal::new(Some("Firefox"), None));
    let b = builder.fingerprint(&DeviceSignal::new(Some("Chrome"), None));
    assert_ne!(a.user_agent_hash, b.user_agent_hash);
    assert_eq!(a.user_agent_hash.len(), 64);
    assert!(!a.user_agent_hash.contains("Firefox"));
}

#[test]
fn test_missing_signal_is_stable() {
    let builder = FingerprintBuilder::default();
    let a = builder.fingerprint(&DeviceSignal::default());
    let b = builder.fingerprint(&DeviceSignal::new(Some("   "), None));
    assert_eq!(a, b);
    assert_eq!(a.ip_prefix, "-");
}
