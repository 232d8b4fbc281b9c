//! Tests for token issue, verify and remaining validity

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode_header, encode, EncodingKey, Header};
use serde_json::json;
use tg_shared::config::JwtConfig;

use super::{codec_with, codec_with_skew, secs, test_codec, TEST_SECRET};
use crate::domain::entities::token::TokenType;
use crate::errors::{DomainError, TokenError};
use crate::services::token::{SigningKeys, TokenCodec, TokenCodecConfig};

fn sign_raw(payload: serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &payload,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_issue_and_verify_round_trip() {
    let codec = test_codec();
    let issued = codec.issue_access(42, &["ADMIN"]).unwrap();

    let claims = codec.verify(&issued.token).unwrap();
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.user_id, Some(42));
    assert_eq!(claims.iss, "tollgate");
    assert_eq!(claims.aud, "frontend");
    assert_eq!(claims.typ, TokenType::Access);
    assert_eq!(claims.jti.as_deref(), Some(issued.jti.as_str()));
    assert_eq!(claims.roles, vec!["ADMIN", "MANAGER", "USER"]);
    assert_eq!(
        claims.authorities,
        vec!["ROLE_ADMIN", "ROLE_MANAGER", "ROLE_USER"]
    );
}

#[test]
fn test_default_lifetimes() {
    let codec = test_codec();
    let access = codec.issue_access(42, &["USER"]).unwrap();
    let refresh = codec.issue_refresh(42, &["USER"]).unwrap();

    let access_secs = (access.expires_at - Utc::now()).num_seconds();
    let refresh_secs = (refresh.expires_at - Utc::now()).num_seconds();
    assert!((895..=900).contains(&access_secs));
    assert!((604795..=604800).contains(&refresh_secs));
}

#[test]
fn test_fresh_jti_per_issue() {
    let codec = test_codec();
    let a = codec.issue_refresh(1, &["USER"]).unwrap();
    let b = codec.issue_refresh(1, &["USER"]).unwrap();
    assert_ne!(a.jti, b.jti);
}

#[test]
fn test_supplied_jti_is_used() {
    let codec = test_codec();
    let issued = codec
        .issue("7", &["USER"], TokenType::Refresh, None, Some("fixed-jti".to_string()))
        .unwrap();
    assert_eq!(issued.jti, "fixed-jti");
    assert_eq!(codec.verify(&issued.token).unwrap().require_jti().unwrap(), "fixed-jti");
}

#[test]
fn test_kid_header_stamped() {
    let codec = test_codec();
    let issued = codec.issue_access(1, &["USER"]).unwrap();
    let header = decode_header(&issued.token).unwrap();
    assert_eq!(header.kid.as_deref(), Some("hmac-1"));
}

#[test]
fn test_non_numeric_subject_has_no_user_id() {
    let codec = test_codec();
    let issued = codec
        .issue("alice", &["USER"], TokenType::Access, None, None)
        .unwrap();
    let claims = codec.verify(&issued.token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.user_id, None);
}

#[test]
fn test_issue_rejects_blank_subject_and_non_positive_ttl() {
    let codec = test_codec();
    assert!(codec.issue(" ", &["USER"], TokenType::Access, None, None).is_err());
    assert!(codec
        .issue("1", &["USER"], TokenType::Access, secs(0), None)
        .is_err());
}

#[test]
fn test_wrong_type_rejected() {
    let codec = test_codec();
    let access = codec.issue_access(42, &["USER"]).unwrap();
    let refresh = codec.issue_refresh(42, &["USER"]).unwrap();

    assert_eq!(
        codec.verify_as(&access.token, TokenType::Refresh),
        Err(TokenError::WrongType {
            expected: TokenType::Refresh,
            actual: TokenType::Access,
        })
    );
    assert!(matches!(
        codec.verify_as(&refresh.token, TokenType::Access),
        Err(TokenError::WrongType { .. })
    ));
    assert!(codec.verify_as(&refresh.token, TokenType::Refresh).is_ok());
}

#[test]
fn test_garbage_is_malformed() {
    let codec = test_codec();
    assert_eq!(codec.verify("not-a-token"), Err(TokenError::Malformed));
    assert_eq!(codec.verify(""), Err(TokenError::Malformed));
}

#[test]
fn test_other_key_is_invalid_signature() {
    let codec = test_codec();
    let other = codec_with(
        TokenCodecConfig::default(),
        "another-secret-that-is-at-least-32-bytes-long",
    );
    let issued = other.issue_access(42, &["USER"]).unwrap();
    assert_eq!(codec.verify(&issued.token), Err(TokenError::InvalidSignature));
}

#[test]
fn test_issuer_and_audience_mismatch() {
    let codec = test_codec();

    let other_issuer = codec_with(
        TokenCodecConfig {
            issuer: "someone-else".to_string(),
            ..Default::default()
        },
        TEST_SECRET,
    );
    let issued = other_issuer.issue_access(1, &["USER"]).unwrap();
    assert_eq!(codec.verify(&issued.token), Err(TokenError::IssuerOrAudienceMismatch));

    let other_audience = codec_with(
        TokenCodecConfig {
            audience: "mobile".to_string(),
            ..Default::default()
        },
        TEST_SECRET,
    );
    let issued = other_audience.issue_access(1, &["USER"]).unwrap();
    assert_eq!(codec.verify(&issued.token), Err(TokenError::IssuerOrAudienceMismatch));
}

#[test]
fn test_missing_issuer_fails_closed() {
    let codec = test_codec();
    let exp = Utc::now().timestamp() + 600;
    let token = sign_raw(
        json!({"sub": "1", "aud": "frontend", "exp": exp, "typ": "acc"}),
        TEST_SECRET,
    );
    assert_eq!(codec.verify(&token), Err(TokenError::IssuerOrAudienceMismatch));
}

#[test]
fn test_unknown_type_is_unsupported() {
    let codec = test_codec();
    let exp = Utc::now().timestamp() + 600;
    let token = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend", "exp": exp, "typ": "id"}),
        TEST_SECRET,
    );
    assert_eq!(codec.verify(&token), Err(TokenError::UnsupportedType));
}

#[test]
fn test_string_roles_from_foreign_signer_accepted() {
    let codec = test_codec();
    let exp = Utc::now().timestamp() + 600;
    let token = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend", "exp": exp,
               "typ": "access", "roles": "ADMIN USER"}),
        TEST_SECRET,
    );
    let claims = codec.verify(&token).unwrap();
    assert_eq!(claims.roles, vec!["ADMIN", "USER"]);
    assert_eq!(claims.typ, TokenType::Access);
}

#[test]
fn test_expired_outside_skew_rejected() {
    let codec = codec_with_skew(60);
    let exp = Utc::now().timestamp() - 120;
    let token = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend", "exp": exp, "typ": "acc"}),
        TEST_SECRET,
    );
    assert_eq!(codec.verify(&token), Err(TokenError::Expired));
}

#[test]
fn test_expired_within_skew_accepted() {
    let codec = codec_with_skew(60);
    let exp = Utc::now().timestamp() - 10;
    let token = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend", "exp": exp, "typ": "acc"}),
        TEST_SECRET,
    );
    assert!(codec.verify(&token).is_ok());

    let strict = codec_with_skew(0);
    assert_eq!(strict.verify(&token), Err(TokenError::Expired));
}

#[test]
fn test_remaining_validity() {
    let codec = test_codec();
    let issued = codec
        .issue("1", &["USER"], TokenType::Access, secs(120), None)
        .unwrap();

    let remaining = codec.remaining_validity(&issued.token);
    assert!(remaining > Duration::seconds(115));
    assert!(remaining <= Duration::seconds(120));
}

#[test]
fn test_remaining_validity_non_positive_for_bad_tokens() {
    let codec = test_codec();
    assert!(codec.remaining_validity("garbage") <= Duration::zero());

    let exp = Utc::now().timestamp() - 30;
    let expired = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend", "exp": exp, "typ": "acc"}),
        TEST_SECRET,
    );
    assert!(codec.remaining_validity(&expired) <= Duration::zero());

    let forged = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend",
               "exp": Utc::now().timestamp() + 600, "typ": "acc"}),
        "forged-secret-forged-secret-forged-secret!!",
    );
    assert!(codec.remaining_validity(&forged) <= Duration::zero());
}

#[test]
fn test_acceptance_window_extends_past_exp_by_leeway() {
    let codec = codec_with_skew(60);
    let issued = codec
        .issue("1", &["USER"], TokenType::Access, secs(120), None)
        .unwrap();

    let window = codec.acceptance_window(&issued.token);
    assert!(window > Duration::seconds(175));
    assert!(window <= Duration::seconds(181));
}

#[test]
fn test_acceptance_window_covers_expired_token_within_skew() {
    let codec = codec_with_skew(60);
    let exp = Utc::now().timestamp() - 10;
    let token = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend", "exp": exp, "typ": "acc"}),
        TEST_SECRET,
    );

    assert!(codec.verify(&token).is_ok());
    assert!(codec.remaining_validity(&token) <= Duration::zero());
    assert!(codec.acceptance_window(&token) > Duration::seconds(45));

    assert_eq!(codec_with_skew(0).acceptance_window(&token), Duration::zero());
}

#[test]
fn test_acceptance_window_zero_for_bad_tokens() {
    let codec = test_codec();
    assert_eq!(codec.acceptance_window("garbage"), Duration::zero());

    let forged = sign_raw(
        json!({"sub": "1", "iss": "tollgate", "aud": "frontend",
               "exp": Utc::now().timestamp() + 600, "typ": "acc"}),
        "forged-secret-forged-secret-forged-secret!!",
    );
    assert_eq!(codec.acceptance_window(&forged), Duration::zero());
}

#[test]
fn test_weak_key_rejected_at_construction() {
    let result = SigningKeys::hmac(b"too-short");
    assert!(matches!(result, Err(DomainError::WeakKeyConfigured { bits: 72 })));

    let config = JwtConfig::new("short");
    assert!(matches!(
        TokenCodec::from_jwt_config(&config),
        Err(DomainError::WeakKeyConfigured { .. })
    ));
}

#[test]
fn test_secret_quotes_stripped() {
    let quoted = format!("  \"{}\"  ", TEST_SECRET);
    let from_quoted = TokenCodec::from_jwt_config(&JwtConfig::new(quoted)).unwrap();
    let issued = from_quoted.issue_access(1, &["USER"]).unwrap();
    assert!(test_codec().verify(&issued.token).is_ok());
}

#[test]
fn test_base64_secret() {
    let raw = [7u8; 32];
    let config = JwtConfig {
        secret: STANDARD.encode(raw),
        secret_is_base64: true,
        ..Default::default()
    };
    let codec = TokenCodec::from_jwt_config(&config).unwrap();
    let issued = codec.issue_access(1, &["USER"]).unwrap();

    let same_key = TokenCodec::new(TokenCodecConfig::default(), SigningKeys::hmac(&raw).unwrap())
        .unwrap();
    assert!(same_key.verify(&issued.token).is_ok());

    let bad = JwtConfig {
        secret: "%%% not base64 %%%".to_string(),
        secret_is_base64: true,
        ..Default::default()
    };
    assert!(matches!(
        TokenCodec::from_jwt_config(&bad),
        Err(DomainError::Configuration { .. })
    ));
}

#[test]
fn test_short_base64_secret_is_weak() {
    let config = JwtConfig {
        secret: STANDARD.encode([1u8; 16]),
        secret_is_base64: true,
        ..Default::default()
    };
    assert!(matches!(
        TokenCodec::from_jwt_config(&config),
        Err(DomainError::WeakKeyConfigured { bits: 128 })
    ));
}

#[test]
fn test_unsupported_algorithm_rejected() {
    let config = JwtConfig {
        algorithm: "none".to_string(),
        ..JwtConfig::new(TEST_SECRET)
    };
    assert!(matches!(
        TokenCodec::from_jwt_config(&config),
        Err(DomainError::Configuration { .. })
    ));
}

#[test]
fn test_key_fingerprint_does_not_reveal_key() {
    let keys = SigningKeys::hmac(TEST_SECRET.as_bytes()).unwrap();
    assert_eq!(keys.fingerprint().len(), 16);
    assert!(!TEST_SECRET.contains(keys.fingerprint()));
    assert_eq!(keys.bits(), Some(TEST_SECRET.len() * 8));
    assert!(!format!("{:?}", keys).contains(TEST_SECRET));
}
