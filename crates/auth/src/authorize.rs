//! Operation admission: policy checks against the authenticated identity.

use crate::error::AuthzError;
use crate::{AuthIdentity, Permission, PermissionResolver, Role};

/// Access policy for a protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Privileged bypass: admits the `admin` role without consulting the
    /// permission resolver at all. Every other role is denied, whatever its
    /// resolved permissions would be.
    AdminOnly,

    /// Fine-grained check against the role's resolved permission set.
    Require(Permission),
}

impl AccessPolicy {
    pub fn require(permission: impl Into<Permission>) -> Self {
        Self::Require(permission.into())
    }
}

/// Admit or deny `identity` for an operation guarded by `policy`.
///
/// Denials are fail-closed: a missing role, an unreachable role source, and
/// an absent permission all reject the operation.
pub async fn check_access(
    identity: &AuthIdentity,
    policy: &AccessPolicy,
    resolver: &PermissionResolver,
) -> Result<(), AuthzError> {
    let role = identity.role().ok_or(AuthzError::NoRole)?;

    match policy {
        AccessPolicy::AdminOnly => {
            if role.is_admin() {
                Ok(())
            } else {
                Err(AuthzError::InsufficientPermission(
                    crate::ADMIN_ROLE.to_string(),
                ))
            }
        }
        AccessPolicy::Require(permission) => {
            require_permission(role, permission, resolver).await
        }
    }
}

/// Check that `role` grants `permission` according to the resolver.
///
/// The wildcard grant `"*"` admits any permission.
pub async fn require_permission(
    role: &Role,
    permission: &Permission,
    resolver: &PermissionResolver,
) -> Result<(), AuthzError> {
    let granted = resolver
        .permissions_for_role(role)
        .await
        .map_err(AuthzError::LookupFailed)?;

    if granted.contains("*") || granted.contains(permission.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientPermission(
            permission.as_str().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::resolver::{RoleSource, StaticRoleSource};
    use crate::{Claims, Role};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::Arc;
    use std::time::Duration;

    fn identity(role: Option<&'static str>) -> AuthIdentity {
        AuthIdentity::new(Claims {
            subject: "user-1".to_string(),
            tenant_id: "c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10".to_string(),
            token_id: "token-1".to_string(),
            role: role.map(Role::new),
            extra: Map::new(),
        })
    }

    /// Fails the test if the resolver ever reaches the remote source.
    struct UnreachableSource;

    #[async_trait]
    impl RoleSource for UnreachableSource {
        async fn permissions_for(&self, role: &str) -> Result<Vec<String>, LookupError> {
            panic!("role source consulted for '{}'", role);
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RoleSource for FailingSource {
        async fn permissions_for(&self, _role: &str) -> Result<Vec<String>, LookupError> {
            Err(LookupError::new("role service down"))
        }
    }

    fn resolver(source: impl RoleSource + 'static) -> PermissionResolver {
        PermissionResolver::new(Arc::new(source), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn admin_only_admits_admin_without_resolver_call() {
        let resolver = resolver(UnreachableSource);
        let admitted = check_access(&identity(Some("admin")), &AccessPolicy::AdminOnly, &resolver)
            .await;
        assert!(admitted.is_ok());
    }

    #[tokio::test]
    async fn admin_only_denies_other_roles_without_resolver_call() {
        let resolver = resolver(UnreachableSource);
        let err = check_access(&identity(Some("viewer")), &AccessPolicy::AdminOnly, &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::InsufficientPermission(_)));
    }

    #[tokio::test]
    async fn missing_role_is_denied_before_any_lookup() {
        let resolver = resolver(UnreachableSource);
        let err = check_access(
            &identity(None),
            &AccessPolicy::require("billing.read"),
            &resolver,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuthzError::NoRole);
    }

    #[tokio::test]
    async fn granted_permission_is_admitted() {
        let resolver = resolver(StaticRoleSource::new().grant("viewer", ["read"]));
        let admitted = check_access(
            &identity(Some("viewer")),
            &AccessPolicy::require("read"),
            &resolver,
        )
        .await;
        assert!(admitted.is_ok());
    }

    #[tokio::test]
    async fn absent_permission_is_denied() {
        let resolver = resolver(StaticRoleSource::new().grant("viewer", ["read"]));
        let err = check_access(
            &identity(Some("viewer")),
            &AccessPolicy::require("write"),
            &resolver,
        )
        .await
        .unwrap_err();
        assert_eq!(err, AuthzError::InsufficientPermission("write".to_string()));
    }

    #[tokio::test]
    async fn wildcard_grant_admits_any_permission() {
        let resolver = resolver(StaticRoleSource::new().grant("root", ["*"]));
        let admitted = check_access(
            &identity(Some("root")),
            &AccessPolicy::require("anything.at.all"),
            &resolver,
        )
        .await;
        assert!(admitted.is_ok());
    }

    #[tokio::test]
    async fn lookup_failure_denies_closed() {
        let resolver = resolver(FailingSource);
        let err = check_access(
            &identity(Some("viewer")),
            &AccessPolicy::require("read"),
            &resolver,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthzError::LookupFailed(_)));
    }
}
