//! One-time exchange codes: a short-lived, single-use handle for a token pair

mod service;

#[cfg(test)]
mod tests;

pub use service::{OneTimeCodeBroker, MIN_CODE_BYTES};
