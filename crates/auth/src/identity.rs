//! The authenticated identity attached to an admitted request.

use stratum_core::{IdError, TenantId, UserId};

use crate::{Claims, Role};

/// Identity produced by the authentication gate.
///
/// This is the one canonical carrier of "who is calling": it is attached to
/// the request context exactly once, and every consumer (authorization,
/// tenant session binding, handlers) reads it through these accessors
/// instead of fishing raw values out of an untyped bag.
///
/// Owned by a single in-flight request; never shared across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthIdentity {
    claims: Claims,
}

impl AuthIdentity {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> &str {
        &self.claims.subject
    }

    /// User id parsed into its strongly-typed UUID form.
    ///
    /// Platform-issued tokens carry UUID subjects; external service accounts
    /// may not, so this stays fallible.
    pub fn user(&self) -> Result<UserId, IdError> {
        self.claims.subject.parse()
    }

    /// Tenant id exactly as carried by the token.
    pub fn tenant_id(&self) -> &str {
        &self.claims.tenant_id
    }

    /// Tenant id parsed into its strongly-typed UUID form.
    ///
    /// The session binder goes through this before any database statement is
    /// issued; a malformed tenant id never reaches the database.
    pub fn tenant(&self) -> Result<TenantId, IdError> {
        self.claims.tenant_id.parse()
    }

    pub fn token_id(&self) -> &str {
        &self.claims.token_id
    }

    pub fn role(&self) -> Option<&Role> {
        self.claims.role.as_ref()
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn identity(tenant_id: &str) -> AuthIdentity {
        AuthIdentity::new(Claims {
            subject: "user-1".to_string(),
            tenant_id: tenant_id.to_string(),
            token_id: "token-1".to_string(),
            role: Some(Role::new("viewer")),
            extra: Map::new(),
        })
    }

    #[test]
    fn tenant_parses_when_uuid() {
        let id = identity("c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10");
        assert!(id.tenant().is_ok());
    }

    #[test]
    fn tenant_parse_fails_for_non_uuid() {
        let id = identity("abc");
        assert!(id.tenant().is_err());
    }

    #[test]
    fn user_parse_follows_subject_shape() {
        let mut claims = identity("c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10")
            .claims()
            .clone();
        assert!(AuthIdentity::new(claims.clone()).user().is_err());

        claims.subject = "8a3a1b9e-0d6a-4b59-9a3e-2f1f9c3b7a21".to_string();
        assert!(AuthIdentity::new(claims).user().is_ok());
    }
}
