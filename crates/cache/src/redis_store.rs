//! Redis key-value store with JSON-serialized values.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The key does not exist. Distinguished from transport failures so that
    /// "absent" can carry meaning (e.g. "not revoked") without being
    /// conflated with "store unreachable".
    #[error("cache: key not found")]
    Miss,

    #[error("redis connection error: {0}")]
    Connection(String),

    #[error("redis command error: {0}")]
    Command(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Connection settings for the Redis store.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl RedisConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
            db: 0,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Connection URL in the form `redis://[:password@]host:port/db`.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => {
                format!("redis://:{}@{}:{}/{}", password, self.host, self.port, self.db)
            }
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Shared async Redis client.
///
/// Values are stored as JSON. The connection manager reconnects internally
/// and is cheap to clone; one `RedisStore` serves all concurrent requests of
/// a process.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url())
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self { manager })
    }

    /// Store `value` under `key`, optionally with an expiry.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let data =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.manager.clone();
        match ttl {
            Some(ttl) => conn
                .set_ex(key, data, ttl.as_secs())
                .await
                .map_err(|e| CacheError::Command(e.to_string())),
            None => conn
                .set(key, data)
                .await
                .map_err(|e| CacheError::Command(e.to_string())),
        }
    }

    /// Fetch and deserialize the value under `key`.
    ///
    /// Returns [`CacheError::Miss`] when the key does not exist.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        let mut conn = self.manager.clone();
        let data: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))?;

        let data = data.ok_or(CacheError::Miss)?;
        serde_json::from_str(&data).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del(key)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    /// Whether `key` exists, without fetching its value.
    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.manager.clone();
        conn.exists(key)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }
}
