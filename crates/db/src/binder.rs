//! The tenant session binder.

use async_trait::async_trait;
use thiserror::Error;

use stratum_auth::AuthIdentity;
use stratum_core::TenantId;

pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Low-level transaction operations the binder drives.
///
/// Production uses the Postgres driver; tests use an in-memory driver that
/// records the calls it receives, so bind ordering and rollback behavior can
/// be asserted without a database.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, DriverError>;

    /// Bind `tenant` to the transaction as a session-local setting.
    ///
    /// Must run on a fresh transaction before any other statement.
    async fn set_tenant(&self, tx: &mut Self::Tx, tenant: TenantId) -> Result<(), DriverError>;

    async fn rollback(&self, tx: Self::Tx) -> Result<(), DriverError>;
}

#[derive(Debug, Error)]
pub enum BindError {
    #[error("identity has no tenant id")]
    NoTenant,

    /// The tenant id failed UUID validation. No database statement has been
    /// issued at this point; the validation is what keeps the tenant value
    /// from ever reaching the session-scoping statement unchecked.
    #[error("tenant id is not a valid UUID")]
    InvalidTenantId,

    #[error("failed to begin transaction")]
    Begin(#[source] DriverError),

    /// Setting the tenant context failed. The transaction has already been
    /// rolled back by the time this is returned.
    #[error("failed to set tenant context")]
    RlsSetup(#[source] DriverError),

    #[error("rollback failed after tenant context error: {rollback}; original error: {cause}")]
    RollbackFailed {
        cause: DriverError,
        rollback: DriverError,
    },
}

/// Hands out transactions pre-bound to the calling identity's tenant.
pub struct TenantDb<D: SessionDriver> {
    driver: D,
}

impl<D: SessionDriver> TenantDb<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Begin a transaction bound to the identity's tenant.
    ///
    /// The caller owns the returned transaction's commit/rollback lifecycle.
    pub async fn begin(&self, identity: &AuthIdentity) -> Result<D::Tx, BindError> {
        self.begin_for_tenant(identity.tenant_id()).await
    }

    /// Begin a transaction bound to an explicit tenant id (background jobs
    /// and workers that act for a known tenant).
    pub async fn begin_for_tenant(&self, tenant_id: &str) -> Result<D::Tx, BindError> {
        if tenant_id.is_empty() {
            return Err(BindError::NoTenant);
        }

        let tenant: TenantId = tenant_id.parse().map_err(|_| BindError::InvalidTenantId)?;

        let mut tx = self.driver.begin().await.map_err(BindError::Begin)?;

        if let Err(cause) = self.driver.set_tenant(&mut tx, tenant).await {
            tracing::error!(error = %cause, %tenant, "failed to set tenant context, rolling back");
            return match self.driver.rollback(tx).await {
                Ok(()) => Err(BindError::RlsSetup(cause)),
                Err(rollback) => Err(BindError::RollbackFailed { cause, rollback }),
            };
        }

        Ok(tx)
    }
}
