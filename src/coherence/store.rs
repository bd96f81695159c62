//! Shared version store: the arbiter of the current configuration generation.

use dashmap::DashMap;
use thiserror::Error;

use super::token::IdentityToken;

/// Key under which the current token lives in the shared store namespace.
pub const CACHE_KEY: &str = "tilestache_cfg_id";

/// Shared-store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The shared store could not be reached; fatal to the access attempt,
    /// never retried at this layer.
    #[error("shared version store unavailable: {0}")]
    Unavailable(String),
}

/// Cross-process key-value register holding the currently-valid token.
///
/// The store holds at most one token at a time. Implementations wrap a
/// shared cache service with atomic get/set/delete semantics; no
/// multi-key transactions are assumed.
pub trait VersionStore: Send + Sync {
    /// Read the current token, if any generation has been published.
    fn get(&self) -> Result<Option<IdentityToken>, StoreError>;

    /// Publish a token as the current generation, with no expiry.
    fn set(&self, token: IdentityToken) -> Result<(), StoreError>;

    /// Remove the token, forcing every process to rebuild on next access.
    fn delete(&self) -> Result<(), StoreError>;
}

/// In-memory version store for tests and single-host embedding.
///
/// Safe to share across threads; cross-process deployments substitute an
/// implementation backed by a shared cache service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, u64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for MemoryStore {
    fn get(&self) -> Result<Option<IdentityToken>, StoreError> {
        Ok(self
            .entries
            .get(CACHE_KEY)
            .map(|entry| IdentityToken::from_raw(*entry)))
    }

    fn set(&self, token: IdentityToken) -> Result<(), StoreError> {
        self.entries.insert(CACHE_KEY.to_string(), token.value());
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        self.entries.remove(CACHE_KEY);
        Ok(())
    }
}
