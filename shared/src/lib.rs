//! Shared configuration, logging and error types for Tollgate
//!
//! This crate provides common functionality used across all Tollgate crates:
//! - Layered configuration (`config`)
//! - Error response structures (`errors`)
//! - Tracing subscriber setup (`logging`)
//! - Secret masking helpers (`utils`)

pub mod config;
pub mod errors;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CacheType, ConfigLoadError, Environment,
    ExchangeCodeConfig, JwtConfig, LoggingConfig, RefreshCookieConfig, SessionBindingConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
