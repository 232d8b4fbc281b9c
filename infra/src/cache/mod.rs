//! Key-value store adapters
//!
//! Redis client with retry and deadlines, the Redis-backed
//! `KeyValueStore`, and backend selection from `CacheConfig`.

pub mod backend;
pub mod redis_client;
pub mod redis_store;


pub use backend::connect_store;
pub use redis_client::RedisClient;
pub use redis_store::RedisStore;

// Re-export commonly used types
pub use tg_shared::config::CacheConfig;
