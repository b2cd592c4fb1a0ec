//! `stratum-db` — tenant-scoped database sessions.
//!
//! Every transaction handed out by this crate has the caller's tenant id
//! bound to it as a session-local setting before any other statement runs,
//! which is what activates row-level security for the transaction's
//! lifetime. A transaction is never returned half-configured: if the
//! binding statement fails, the transaction is rolled back and the error
//! surfaced.

pub mod binder;
pub mod in_memory;
pub mod postgres;

pub use binder::{BindError, DriverError, SessionDriver, TenantDb};
pub use in_memory::{InMemorySession, InMemorySessionDriver};
pub use postgres::{PgSessionDriver, PostgresConfig, PostgresTenantDb, connect};
