//! Authentication middleware: the request-admission gate.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use stratum_auth::{AuthError, RevocationStore, TokenVerifier};

use crate::error::ApiError;

/// Injected dependencies for the authentication gate.
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl AuthState {
    pub fn new(verifier: Arc<TokenVerifier>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            verifier,
            revocations,
        }
    }
}

/// Admit or reject the request, attaching the authenticated identity.
///
/// On success the [`stratum_auth::AuthIdentity`] is inserted into the
/// request extensions, once, under its own type, and the request proceeds.
/// Any failure ends the request here with the mapped status code; nothing
/// partial is attached.
///
/// Install with `axum::middleware::from_fn_with_state(auth_state, authenticate)`.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let identity =
        stratum_auth::authenticate(token, &state.verifier, state.revocations.as_ref()).await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let header = header.to_str().map_err(|_| AuthError::MalformedScheme)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedScheme)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedScheme);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(
                axum::http::header::AUTHORIZATION,
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(
            extract_bearer(&headers(None)).unwrap_err(),
            AuthError::MissingHeader
        );
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        assert_eq!(
            extract_bearer(&headers(Some("Basic dXNlcjpwYXNz"))).unwrap_err(),
            AuthError::MalformedScheme
        );
    }

    #[test]
    fn empty_token_is_rejected() {
        assert_eq!(
            extract_bearer(&headers(Some("Bearer   "))).unwrap_err(),
            AuthError::MalformedScheme
        );
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_bearer(&headers(Some("Bearer abc.def.ghi"))).unwrap(),
            "abc.def.ghi"
        );
    }
}
