//! Verified token claims.
//!
//! Tokens issued across the platform have drifted between two claim-name
//! conventions (`sub` vs `user_id`, `tenant_id` vs `tid`). Both are accepted
//! on the wire and normalized into one [`Claims`] shape here, so nothing
//! downstream ever looks at raw claim names again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Role;
use crate::error::AuthError;

/// Claims of a verified token, normalized to canonical names.
///
/// Created once per request by the authentication gate, owned by that
/// request, and discarded with it; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    /// Authenticated user id (`sub`, falling back to `user_id`).
    pub subject: String,

    /// Tenant the token is scoped to (`tenant_id`, falling back to `tid`).
    ///
    /// Kept as a string here: UUID validation is the session binder's job,
    /// so a malformed tenant id fails at bind time, not at authentication.
    pub tenant_id: String,

    /// Unique id of this token issuance (`jti`), the revocation-list key.
    pub token_id: String,

    /// RBAC role granted within the tenant, when present.
    pub role: Option<Role>,

    /// Remaining claims, passed through opaquely.
    pub extra: Map<String, Value>,
}

/// Wire shape of the claim set before normalization.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: Option<String>,
    user_id: Option<String>,
    tenant_id: Option<String>,
    tid: Option<String>,
    jti: Option<String>,
    role: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Claims {
    pub(crate) fn from_raw(raw: RawClaims) -> Result<Self, AuthError> {
        let token_id =
            non_empty(raw.jti).ok_or_else(|| AuthError::MissingClaim("jti".to_string()))?;

        let subject = non_empty(raw.sub)
            .or_else(|| non_empty(raw.user_id))
            .ok_or_else(|| AuthError::MissingClaim("sub".to_string()))?;

        let tenant_id = non_empty(raw.tenant_id)
            .or_else(|| non_empty(raw.tid))
            .ok_or_else(|| AuthError::MissingClaim("tenant_id".to_string()))?;

        let role = non_empty(raw.role).map(Role::new);

        Ok(Self {
            subject,
            tenant_id,
            token_id,
            role,
            extra: raw.extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(payload: serde_json::Value) -> RawClaims {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn canonical_names_are_normalized() {
        let claims = Claims::from_raw(raw(serde_json::json!({
            "sub": "user-1",
            "tenant_id": "c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10",
            "jti": "token-1",
            "role": "viewer",
            "exp": 4102444800u64,
        })))
        .unwrap();

        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.token_id, "token-1");
        assert_eq!(claims.role.as_ref().unwrap().as_str(), "viewer");
        assert!(claims.extra.contains_key("exp"));
    }

    #[test]
    fn legacy_names_are_accepted() {
        let claims = Claims::from_raw(raw(serde_json::json!({
            "user_id": "user-2",
            "tid": "c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10",
            "jti": "token-2",
        })))
        .unwrap();

        assert_eq!(claims.subject, "user-2");
        assert_eq!(claims.tenant_id, "c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10");
        assert!(claims.role.is_none());
    }

    #[test]
    fn missing_jti_is_a_missing_claim() {
        let err = Claims::from_raw(raw(serde_json::json!({
            "sub": "user-3",
            "tenant_id": "c7d4b342-3c44-4a3e-9b3c-7a35ad1b0a10",
        })))
        .unwrap_err();

        assert_eq!(err, AuthError::MissingClaim("jti".to_string()));
    }

    #[test]
    fn empty_tenant_counts_as_missing() {
        let err = Claims::from_raw(raw(serde_json::json!({
            "sub": "user-4",
            "tenant_id": "",
            "jti": "token-4",
        })))
        .unwrap_err();

        assert_eq!(err, AuthError::MissingClaim("tenant_id".to_string()));
    }
}
