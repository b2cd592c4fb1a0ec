//! Revocation-list lookup.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;

/// Lookup against the revocation list.
///
/// Existence of the token id as a key means revoked; absence means not
/// revoked. A transport failure must surface as [`StoreError`]: callers
/// treat it as a hard rejection, never as "not revoked".
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError>;
}

/// In-memory revocation list for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: Mutex<HashSet<String>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, token_id: impl Into<String>) {
        let mut revoked = match self.revoked.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        revoked.insert(token_id.into());
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError> {
        let revoked = match self.revoked.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(revoked.contains(token_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_means_not_revoked() {
        let store = InMemoryRevocationStore::new();
        assert!(!store.is_revoked("token-1").await.unwrap());
    }

    #[tokio::test]
    async fn revoked_key_is_reported() {
        let store = InMemoryRevocationStore::new();
        store.revoke("token-1");
        assert!(store.is_revoked("token-1").await.unwrap());
        assert!(!store.is_revoked("token-2").await.unwrap());
    }
}
