//! `stratum-secrets` — secret retrieval from the central Vault store.
//!
//! Read-only client for the KV v2 engine. Services fetch their signing
//! secrets and database credentials at startup and hand them to the
//! components that need them; nothing here writes secrets or touches the
//! storage engine itself.

pub mod vault;

pub use vault::{SecretsError, VaultClient, VaultConfig};
