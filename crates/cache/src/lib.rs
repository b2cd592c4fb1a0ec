//! `stratum-cache` — Redis-backed key-value plumbing.
//!
//! One shared client covers the platform's fast-store needs: generic
//! JSON-value caching and the token revocation list the authentication gate
//! consults.

pub mod redis_store;
pub mod revocation;

pub use redis_store::{CacheError, RedisConfig, RedisStore};
pub use revocation::RedisRevocationStore;
