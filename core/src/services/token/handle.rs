//! Swappable reference to the active codec

use std::sync::{Arc, RwLock};

use super::codec::TokenCodec;

/// Shared handle to the active [`TokenCodec`]
///
/// Every component receives a clone of the same handle at startup. Key
/// rotation builds a new codec and swaps it in; calls already holding the
/// previous `Arc` finish with the codec they loaded.
#[derive(Debug, Clone)]
pub struct CodecHandle {
    inner: Arc<RwLock<Arc<TokenCodec>>>,
}

impl CodecHandle {
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(codec))),
        }
    }

    /// The codec to use for one operation
    pub fn current(&self) -> Arc<TokenCodec> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the active codec, returning the previous one
    pub fn rotate(&self, codec: TokenCodec) -> Arc<TokenCodec> {
        let next = Arc::new(codec);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let previous = std::mem::replace(&mut *guard, next);
        tracing::info!(kid = %guard.config().kid, "Signing key rotated");
        previous
    }
}

impl From<TokenCodec> for CodecHandle {
    fn from(codec: TokenCodec) -> Self {
        Self::new(codec)
    }
}
