//! Error taxonomy for the admission pipeline.
//!
//! Transport failures never pass as success: a revocation-store outage or a
//! role-source outage rejects the request (fail closed) with an error the
//! HTTP layer can distinguish from an ordinary denial.

use thiserror::Error;

/// Transport-level failure talking to an external store.
///
/// Carries a rendered cause only; callers map this to a generic 500 and log
/// the detail server-side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("store error: {0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Authentication failure (request admission).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header required")]
    MissingHeader,

    #[error("invalid authorization header format, must be a bearer token")]
    MalformedScheme,

    /// Structural, signature, algorithm, and expiry failures all collapse
    /// here; the reason is logged, never surfaced to the caller.
    #[error("invalid token")]
    InvalidToken,

    #[error("token missing required claim '{0}'")]
    MissingClaim(String),

    #[error("token has been revoked")]
    Revoked,

    /// The revocation store could not answer. Distinct from [`AuthError::Revoked`]
    /// so the HTTP layer can return an internal-error status instead of 401.
    #[error("could not verify token against the revocation store")]
    VerificationUnavailable(#[source] StoreError),
}

/// Failure to resolve a role's permission set from the remote source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("role source unavailable: {0}")]
pub struct LookupError(String);

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Authorization failure (operation admission).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("identity carries no role claim")]
    NoRole,

    /// The permission set could not be resolved; the operation is denied.
    #[error("permission lookup failed: {0}")]
    LookupFailed(#[source] LookupError),

    #[error("missing required permission '{0}'")]
    InsufficientPermission(String),
}
