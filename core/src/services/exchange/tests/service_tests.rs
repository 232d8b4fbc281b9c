//! Tests for exchange code issuance and redemption

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tg_shared::config::ExchangeCodeConfig;

use crate::domain::entities::token::TokenPair;
use crate::errors::DomainError;
use crate::repositories::store::{keys, InMemoryStore, KeyValueStore};
use crate::services::exchange::OneTimeCodeBroker;

const TTL: Duration = Duration::from_secs(60);

fn setup() -> (Arc<InMemoryStore>, OneTimeCodeBroker) {
    let store = Arc::new(InMemoryStore::new());
    let broker = OneTimeCodeBroker::new(store.clone(), &ExchangeCodeConfig::default());
    (store, broker)
}

fn pair() -> TokenPair {
    TokenPair::new("access.jwt", "refresh.jwt")
}

#[tokio::test]
async fn test_issue_and_redeem_once() {
    let (_, broker) = setup();
    let code = broker.issue(&pair(), TTL).await.unwrap();

    assert_eq!(broker.redeem(&code).await.unwrap(), pair());
    assert!(matches!(
        broker.redeem(&code).await,
        Err(DomainError::CodeNotFoundOrConsumed)
    ));
}

#[tokio::test]
async fn test_code_format() {
    let (store, broker) = setup();
    let code = broker.issue(&pair(), TTL).await.unwrap();

    // 32 bytes, base64url without padding
    assert_eq!(code.len(), 43);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let stored = store.get(&keys::exchange_code_key(&code)).await.unwrap();
    assert_eq!(stored, r#"{"accessToken":"access.jwt","refreshToken":"refresh.jwt"}"#);
}

#[tokio::test]
async fn test_codes_are_unique() {
    let (_, broker) = setup();
    let a = broker.issue(&pair(), TTL).await.unwrap();
    let b = broker.issue(&pair(), TTL).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_redeem_trims_code() {
    let (_, broker) = setup();
    let code = broker.issue(&pair(), TTL).await.unwrap();
    assert!(broker.redeem(&format!("  {}\n", code)).await.is_ok());
}

#[tokio::test]
async fn test_redeem_blank_or_unknown() {
    let (_, broker) = setup();
    assert!(matches!(
        broker.redeem("   ").await,
        Err(DomainError::CodeNotFoundOrConsumed)
    ));
    assert!(matches!(
        broker.redeem("never-issued").await,
        Err(DomainError::CodeNotFoundOrConsumed)
    ));
}

#[tokio::test]
async fn test_redeem_corrupt_payload_is_consumed() {
    let (store, broker) = setup();
    let key = keys::exchange_code_key("corrupt");
    store.set_with_ttl(&key, "not json", TTL).await.unwrap();

    assert!(matches!(
        broker.redeem("corrupt").await,
        Err(DomainError::CodeNotFoundOrConsumed)
    ));
    assert!(!store.exists(&key).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_code_expires() {
    let (_, broker) = setup();
    let code = broker.issue(&pair(), Duration::from_secs(5)).await.unwrap();

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(matches!(
        broker.redeem(&code).await,
        Err(DomainError::CodeNotFoundOrConsumed)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_redeem_single_winner() {
    let (_, broker) = setup();
    let code = broker.issue(&pair(), TTL).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let broker = broker.clone();
            let code = code.clone();
            tokio::spawn(async move { broker.redeem(&code).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(payload) => {
                assert_eq!(payload, pair());
                winners += 1;
            }
            Err(DomainError::CodeNotFoundOrConsumed) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
}

/// Store whose create-if-absent always loses
struct AlwaysTaken;

#[async_trait]
impl KeyValueStore for AlwaysTaken {
    async fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> Result<(), DomainError> {
        Ok(())
    }
    async fn set_if_absent(&self, _: &str, _: &str, _: Duration) -> Result<bool, DomainError> {
        Ok(false)
    }
    async fn get_and_delete(&self, _: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }
    async fn exists(&self, _: &str) -> Result<bool, DomainError> {
        Ok(false)
    }
    async fn delete(&self, _: &str) -> Result<bool, DomainError> {
        Ok(false)
    }
    async fn delete_by_prefix(&self, _: &str) -> Result<usize, DomainError> {
        Ok(0)
    }
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_issue_exhausts_attempts() {
    let broker = OneTimeCodeBroker::new(Arc::new(AlwaysTaken), &ExchangeCodeConfig::default());
    assert!(matches!(
        broker.issue(&pair(), TTL).await,
        Err(DomainError::ExchangeCodeExhausted)
    ));
}

/// Store that is down
struct Unreachable;

#[async_trait]
impl KeyValueStore for Unreachable {
    async fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> Result<(), DomainError> {
        Err(down())
    }
    async fn set_if_absent(&self, _: &str, _: &str, _: Duration) -> Result<bool, DomainError> {
        Err(down())
    }
    async fn get_and_delete(&self, _: &str) -> Result<Option<String>, DomainError> {
        Err(down())
    }
    async fn exists(&self, _: &str) -> Result<bool, DomainError> {
        Err(down())
    }
    async fn delete(&self, _: &str) -> Result<bool, DomainError> {
        Err(down())
    }
    async fn delete_by_prefix(&self, _: &str) -> Result<usize, DomainError> {
        Err(down())
    }
    async fn ping(&self) -> Result<(), DomainError> {
        Err(down())
    }
}

fn down() -> DomainError {
    DomainError::StoreUnavailable {
        message: "connection refused".to_string(),
    }
}

#[tokio::test]
async fn test_store_outage_is_not_absence() {
    let broker = OneTimeCodeBroker::new(Arc::new(Unreachable), &ExchangeCodeConfig::default());
    assert!(matches!(
        broker.issue(&pair(), TTL).await,
        Err(DomainError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        broker.redeem("abc").await,
        Err(DomainError::StoreUnavailable { .. })
    ));
}
