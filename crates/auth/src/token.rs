//! HS256 token encode/decode against a shared secret.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use tidecrm_core::{AuthError, AuthResult};

use crate::claims::AccessClaims;

/// Sign claims into a compact token.
pub fn encode_token(claims: &AccessClaims, secret: &str) -> AuthResult<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::internal(format!("token encode: {e}")))
}

/// Verify signature and expiry, then extract claims.
///
/// All decode failures collapse to [`AuthError::Unauthorized`]: callers never
/// learn whether the cause was a bad signature, malformed input, or expiry.
/// The real cause is traced at debug level for operators.
pub fn decode_token(token: &str, secret: &str) -> AuthResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub", "exp"]);

    jsonwebtoken::decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        AuthError::Unauthorized
    })
}
