//! Tests for the access-token blacklist

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use crate::domain::entities::token::TokenType;
use crate::repositories::store::{keys, InMemoryStore};
use crate::services::blacklist::BlacklistStore;
use crate::services::token::{CodecHandle, SigningKeys, TokenCodec, TokenCodecConfig};

const SECRET: &[u8] = b"blacklist-test-secret-0123456789abcdef";

fn setup() -> (Arc<InMemoryStore>, CodecHandle, BlacklistStore) {
    let codec = TokenCodec::new(
        TokenCodecConfig::default(),
        SigningKeys::hmac(SECRET).unwrap(),
    )
    .unwrap();
    let handle = CodecHandle::new(codec);
    let store = Arc::new(InMemoryStore::new());
    let blacklist = BlacklistStore::new(store.clone(), handle.clone());
    (store, handle, blacklist)
}

#[tokio::test]
async fn test_add_then_contains() {
    let (_, codec, blacklist) = setup();
    let token = codec.current().issue_access(42, &["USER"]).unwrap().token;

    assert!(!blacklist.contains(&token).await.unwrap());
    assert!(blacklist.add(&token).await.unwrap());
    assert!(blacklist.contains(&token).await.unwrap());
}

/// Access token whose `exp` is `exp_offset_secs` from now
fn access_expiring_in(exp_offset_secs: i64) -> String {
    encode(
        &Header::default(),
        &json!({"sub": "42", "iss": "tollgate", "aud": "frontend",
                "exp": Utc::now().timestamp() + exp_offset_secs, "typ": "acc"}),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

#[tokio::test]
async fn test_entry_ttl_covers_lifetime_and_skew() {
    let (store, codec, blacklist) = setup();
    let token = codec
        .current()
        .issue("42", &["USER"], TokenType::Access, Some(Duration::seconds(300)), None)
        .unwrap()
        .token;

    blacklist.add(&token).await.unwrap();

    // 300 s lifetime + 60 s default leeway + 1 s rounding
    let ttl = store.ttl(&keys::blacklist_key(&token)).await.unwrap();
    assert!(ttl <= StdDuration::from_secs(361));
    assert!(ttl > StdDuration::from_secs(355));
}

#[tokio::test]
async fn test_expired_token_still_accepted_is_blacklisted() {
    let (store, codec, blacklist) = setup();
    let token = access_expiring_in(-10);
    assert!(codec.current().verify(&token).is_ok());

    assert!(blacklist.add(&token).await.unwrap());
    let ttl = store.ttl(&keys::blacklist_key(&token)).await.unwrap();
    assert!(ttl > StdDuration::from_secs(45));
    assert!(ttl <= StdDuration::from_secs(51));
}

#[tokio::test]
async fn test_token_past_leeway_is_noop() {
    let (store, codec, blacklist) = setup();
    let token = access_expiring_in(-120);
    assert!(codec.current().verify(&token).is_err());

    assert!(!blacklist.add(&token).await.unwrap());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_stored_key_is_hashed() {
    let (store, codec, blacklist) = setup();
    let token = codec.current().issue_access(42, &["USER"]).unwrap().token;
    blacklist.add(&token).await.unwrap();

    assert!(store.get(&format!("blacklist:{}", token)).await.is_none());
    assert_eq!(store.get(&keys::blacklist_key(&token)).await.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_invalid_token_is_noop() {
    let (store, _, blacklist) = setup();
    assert!(!blacklist.add("not-a-token").await.unwrap());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_foreign_token_is_noop() {
    let (store, _, blacklist) = setup();
    let foreign = TokenCodec::new(
        TokenCodecConfig::default(),
        SigningKeys::hmac(b"some-other-secret-0123456789abcdefgh").unwrap(),
    )
    .unwrap()
    .issue_access(1, &["USER"])
    .unwrap()
    .token;

    assert!(!blacklist.add(&foreign).await.unwrap());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let (store, codec, blacklist) = setup();
    let token = codec.current().issue_access(42, &["USER"]).unwrap().token;

    assert!(blacklist.add(&token).await.unwrap());
    assert!(blacklist.add(&token).await.unwrap());
    assert_eq!(store.len().await, 1);
}
