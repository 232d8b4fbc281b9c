//! Structured logging setup.
//!
//! Events carry `user_id`, `jti`, `ttl_ms` and `event` fields. Raw token
//! strings and exchange codes are never logged; use
//! [`crate::utils::masking::fingerprint`] when a correlation handle is needed.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `config.level`. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
pub fn init(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},redis=warn", config.level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target)
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.with_target)
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.with_target),
            )
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(format = ?config.format, "Structured logging initialized");
    }
}

/// Log a security event such as refresh-token reuse
pub fn log_security_event(event: &str, user_id: Option<&str>, message: &str) {
    tracing::warn!(event = event, user_id = user_id, "SECURITY: {}", message);
}
