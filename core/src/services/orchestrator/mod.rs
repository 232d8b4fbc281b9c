//! Session lifecycle: login issuance, refresh rotation with reuse detection,
//! logout, exchange codes and request authentication

mod http;
mod service;

#[cfg(test)]
mod tests;

pub use http::extract_bearer;
pub use service::{IssuedSession, SessionOrchestrator, DEFAULT_ROLE};
