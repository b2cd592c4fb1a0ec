//! Per-route authorization middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use stratum_auth::{AccessPolicy, AuthIdentity, Permission, PermissionResolver, check_access};

use crate::error::ApiError;

/// A route's access policy plus the resolver that backs it.
#[derive(Clone)]
pub struct PolicyState {
    pub resolver: Arc<PermissionResolver>,
    pub policy: AccessPolicy,
}

impl PolicyState {
    /// Coarse guard: admits the `admin` role only, without a resolver call.
    pub fn admin_only(resolver: Arc<PermissionResolver>) -> Self {
        Self {
            resolver,
            policy: AccessPolicy::AdminOnly,
        }
    }

    /// Fine-grained guard for one permission.
    pub fn require(resolver: Arc<PermissionResolver>, permission: impl Into<Permission>) -> Self {
        Self {
            resolver,
            policy: AccessPolicy::Require(permission.into()),
        }
    }
}

/// Enforce the route's policy against the authenticated identity.
///
/// Must run after [`crate::middleware::authenticate`]; a request that
/// reaches this middleware without an identity is a wiring bug and is
/// rejected with a 500.
///
/// Install with `axum::middleware::from_fn_with_state(policy_state, enforce)`.
pub async fn enforce(
    State(state): State<PolicyState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<AuthIdentity>()
        .ok_or_else(|| ApiError::internal("identity missing from request"))?;

    check_access(identity, &state.policy, &state.resolver).await?;

    Ok(next.run(req).await)
}
