//! Role-to-permission resolution with a time-bounded cache.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::Role;
use crate::error::LookupError;

/// Remote source of truth for a role's granted permissions.
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn permissions_for(&self, role: &str) -> Result<Vec<String>, LookupError>;
}

/// Resolves a role's permission set, caching results for a fixed TTL.
///
/// The cache is shared by every request in the process. Reads take a shared
/// lock and never block on the remote source; an expired or absent entry is
/// refreshed by calling the source *outside* the lock, then overwriting the
/// entry (never merging). Concurrent refreshes of the same role may each hit
/// the source; the last writer wins, which is harmless because lookups are
/// idempotent.
///
/// A remote failure propagates to the caller and leaves the cache untouched:
/// there is no negative caching, and a stale entry is never served.
pub struct PermissionResolver {
    source: Arc<dyn RoleSource>,
    ttl: Duration,
    cache: RwLock<HashMap<String, CachedPermissions>>,
}

struct CachedPermissions {
    permissions: Arc<HashSet<String>>,
    expires_at: Instant,
}

impl PermissionResolver {
    pub fn new(source: Arc<dyn RoleSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The permission set granted by `role`.
    ///
    /// Served from cache while the entry is unexpired; otherwise refreshed
    /// from the remote source.
    pub async fn permissions_for_role(
        &self,
        role: &Role,
    ) -> Result<Arc<HashSet<String>>, LookupError> {
        if let Some(hit) = self.cached(role.as_str()) {
            return Ok(hit);
        }

        let fetched = self.source.permissions_for(role.as_str()).await?;
        let permissions: Arc<HashSet<String>> = Arc::new(fetched.into_iter().collect());

        let mut cache = write_lock(&self.cache);
        cache.insert(
            role.as_str().to_string(),
            CachedPermissions {
                permissions: Arc::clone(&permissions),
                expires_at: Instant::now() + self.ttl,
            },
        );

        Ok(permissions)
    }

    fn cached(&self, role: &str) -> Option<Arc<HashSet<String>>> {
        let cache = read_lock(&self.cache);
        cache
            .get(role)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| Arc::clone(&entry.permissions))
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Fixed role-to-permission grants, for tests and single-service deployments
/// that do not run a role service.
#[derive(Debug, Default)]
pub struct StaticRoleSource {
    grants: HashMap<String, Vec<String>>,
}

impl StaticRoleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(
        mut self,
        role: impl Into<String>,
        permissions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.grants
            .insert(role.into(), permissions.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait]
impl RoleSource for StaticRoleSource {
    async fn permissions_for(&self, role: &str) -> Result<Vec<String>, LookupError> {
        Ok(self.grants.get(role).cloned().unwrap_or_default())
    }
}

/// Role service client over HTTP.
///
/// Expects `GET {base_url}/roles/{role}` to return the role document with a
/// `permissions` array of strings.
pub struct HttpRoleSource {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct RoleDocument {
    #[serde(default)]
    permissions: Vec<String>,
}

impl HttpRoleSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::new(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl RoleSource for HttpRoleSource {
    async fn permissions_for(&self, role: &str) -> Result<Vec<String>, LookupError> {
        let url = format!("{}/roles/{}", self.base_url, role);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::new(e.to_string()))?
            .error_for_status()
            .map_err(|e| LookupError::new(e.to_string()))?;

        let document: RoleDocument = response
            .json()
            .await
            .map_err(|e| LookupError::new(e.to_string()))?;

        Ok(document.permissions)
    }
}
