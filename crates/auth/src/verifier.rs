//! Credential verification (pure: no I/O).

use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use crate::Claims;
use crate::claims::RawClaims;
use crate::error::AuthError;

/// Verifies bearer tokens against the platform signing secret.
///
/// Only HS256 is accepted. A token declaring any other algorithm (including
/// `none` or an asymmetric one) is rejected outright, regardless of its
/// claims, which closes the algorithm-confusion hole.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Platform tokens carry service-specific audiences; they are not
        // checked at this layer.
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Validate signature, structure, and expiry, then normalize the claims.
    ///
    /// Every structural/signature/expiry failure collapses to
    /// [`AuthError::InvalidToken`]; the concrete reason is logged, never
    /// returned. Absent required claims surface as [`AuthError::MissingClaim`].
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data =
            jsonwebtoken::decode::<RawClaims>(token, &self.key, &self.validation).map_err(|e| {
                tracing::debug!(error = %e, "token failed verification");
                match e.kind() {
                    ErrorKind::MissingRequiredClaim(name) => AuthError::MissingClaim(name.clone()),
                    _ => AuthError::InvalidToken,
                }
            })?;

        Claims::from_raw(data.claims)
    }
}
