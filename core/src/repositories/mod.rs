pub mod store;

pub use store::{keys, InMemoryStore, KeyValueStore};
