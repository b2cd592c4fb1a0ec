//! Mapping from the admission error taxonomy to HTTP responses.
//!
//! Authentication failures are 401 with a broad category only; authorization
//! denials are 403 and may name the missing permission (non-sensitive);
//! store and internal failures are 500 with a generic body, the cause going
//! to the server log alone.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use stratum_auth::{AuthError, AuthzError};
use stratum_db::BindError;

/// An error response: `{"error": ..., "details": ...}` with a status code.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeader => {
                Self::new(StatusCode::UNAUTHORIZED, "Authorization header required")
            }
            AuthError::MalformedScheme => Self::new(
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format, must be a bearer token",
            ),
            AuthError::InvalidToken => Self::new(StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::MissingClaim(claim) => {
                Self::new(StatusCode::UNAUTHORIZED, "Invalid token")
                    .with_details(format!("missing claim '{}'", claim))
            }
            AuthError::Revoked => Self::new(StatusCode::UNAUTHORIZED, "Token has been revoked"),
            AuthError::VerificationUnavailable(cause) => {
                tracing::error!(error = %cause, "revocation check failed");
                Self::internal("Could not verify token")
            }
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NoRole => Self::new(StatusCode::FORBIDDEN, "Access denied")
                .with_details("identity carries no role claim"),
            AuthzError::InsufficientPermission(required) => {
                Self::new(StatusCode::FORBIDDEN, "Access denied")
                    .with_details(format!("requires '{}'", required))
            }
            AuthzError::LookupFailed(cause) => {
                tracing::error!(error = %cause, "permission lookup failed");
                Self::internal("Could not verify permissions")
            }
        }
    }
}

impl From<BindError> for ApiError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::NoTenant => Self::new(StatusCode::BAD_REQUEST, "Tenant id required"),
            BindError::InvalidTenantId => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid tenant id format")
            }
            other => {
                tracing::error!(error = %other, "tenant session binding failed");
                Self::internal("Database error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_auth::StoreError;

    #[test]
    fn authentication_failures_are_401() {
        assert_eq!(
            ApiError::from(AuthError::InvalidToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Revoked).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_outage_is_500_not_401() {
        let err = AuthError::VerificationUnavailable(StoreError::new("down"));
        assert_eq!(
            ApiError::from(err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn authorization_denials_are_403() {
        assert_eq!(
            ApiError::from(AuthzError::NoRole).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthzError::InsufficientPermission("write".to_string())).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn malformed_tenant_is_client_error() {
        assert_eq!(
            ApiError::from(BindError::InvalidTenantId).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
