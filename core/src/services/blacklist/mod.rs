//! Access-token blacklist

mod service;

#[cfg(test)]
mod tests;

pub use service::BlacklistStore;
