//! Redis-backed revocation list.

use async_trait::async_trait;

use stratum_auth::{RevocationStore, StoreError};

use crate::redis_store::{CacheError, RedisStore};

/// Revocation list over the shared Redis store.
///
/// The token id is the key; its mere existence marks the token revoked. The
/// issuing side writes the key with an expiry at least as long as the
/// token's own lifetime, so entries lapse on their own.
#[derive(Clone)]
pub struct RedisRevocationStore {
    store: RedisStore,
}

impl RedisRevocationStore {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError> {
        match self.store.exists(token_id).await {
            Ok(found) => Ok(found),
            // EXISTS never reports Miss; an absent key means not revoked.
            Err(CacheError::Miss) => Ok(false),
            Err(e) => Err(StoreError::new(e.to_string())),
        }
    }
}
