//! Refresh session store: one single-use record per issued refresh token

mod fingerprint;
mod service;

#[cfg(test)]
mod tests;

pub use fingerprint::FingerprintBuilder;
pub use service::RefreshSessionStore;
