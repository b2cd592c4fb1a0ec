//! In-memory session driver for tests and local development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use stratum_core::TenantId;

use crate::binder::{DriverError, SessionDriver};

/// Records every call it receives, in order, so tests can assert the exact
/// statement sequence the binder produces.
#[derive(Debug, Default)]
pub struct InMemorySessionDriver {
    calls: Arc<Mutex<Vec<String>>>,
    fail_set_tenant: AtomicBool,
}

/// A "transaction" from the in-memory driver.
#[derive(Debug)]
pub struct InMemorySession {
    calls: Arc<Mutex<Vec<String>>>,
}

impl InMemorySessionDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next tenant-binding call fail, to exercise rollback paths.
    pub fn fail_set_tenant(self) -> Self {
        self.fail_set_tenant.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: impl Into<String>) {
        lock(&self.calls).push(call.into());
    }
}

impl InMemorySession {
    /// Record a commit, ending the session.
    pub fn commit(self) {
        lock(&self.calls).push("commit".to_string());
    }
}

fn lock(calls: &Mutex<Vec<String>>) -> std::sync::MutexGuard<'_, Vec<String>> {
    match calls.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl SessionDriver for InMemorySessionDriver {
    type Tx = InMemorySession;

    async fn begin(&self) -> Result<Self::Tx, DriverError> {
        self.record("begin");
        Ok(InMemorySession {
            calls: Arc::clone(&self.calls),
        })
    }

    async fn set_tenant(&self, _tx: &mut Self::Tx, tenant: TenantId) -> Result<(), DriverError> {
        self.record(format!("set_tenant {}", tenant));
        if self.fail_set_tenant.load(Ordering::SeqCst) {
            return Err("simulated set_tenant failure".into());
        }
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Tx) -> Result<(), DriverError> {
        self.record("rollback");
        Ok(())
    }
}
