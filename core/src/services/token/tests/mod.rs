mod codec_tests;

use chrono::Duration;

use crate::services::token::{SigningKeys, TokenCodec, TokenCodecConfig};

pub(crate) const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef-test-secret";

pub(crate) fn test_codec() -> TokenCodec {
    codec_with(TokenCodecConfig::default(), TEST_SECRET)
}

pub(crate) fn codec_with(config: TokenCodecConfig, secret: &str) -> TokenCodec {
    TokenCodec::new(config, SigningKeys::hmac(secret.as_bytes()).unwrap()).unwrap()
}

pub(crate) fn codec_with_skew(skew_secs: u64) -> TokenCodec {
    codec_with(
        TokenCodecConfig {
            clock_skew_secs: skew_secs,
            ..Default::default()
        },
        TEST_SECRET,
    )
}

pub(crate) fn secs(n: i64) -> Option<Duration> {
    Some(Duration::seconds(n))
}
