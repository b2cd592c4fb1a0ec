//! The authentication gate: one request-admission decision.

use crate::error::AuthError;
use crate::revocation::RevocationStore;
use crate::{AuthIdentity, TokenVerifier};

/// Admit or reject a bearer token.
///
/// Verification runs first; a token that fails structurally never reaches
/// the revocation store. A store outage rejects the request with
/// [`AuthError::VerificationUnavailable`] rather than letting the token
/// through unverified.
pub async fn authenticate(
    token: &str,
    verifier: &TokenVerifier,
    revocations: &dyn RevocationStore,
) -> Result<AuthIdentity, AuthError> {
    let claims = verifier.verify(token)?;

    match revocations.is_revoked(&claims.token_id).await {
        Ok(true) => {
            tracing::info!(token_id = %claims.token_id, "revoked token rejected");
            Err(AuthError::Revoked)
        }
        Ok(false) => Ok(AuthIdentity::new(claims)),
        Err(e) => {
            tracing::error!(error = %e, "revocation store unavailable");
            Err(AuthError::VerificationUnavailable(e))
        }
    }
}
