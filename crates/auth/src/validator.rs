//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::debug;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bad signature, wrong algorithm, or undecodable payload.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Turns a raw bearer token into verified claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError>;
}

/// HMAC-SHA256 shared-secret validator.
///
/// The token's time window lives in `issued_at` / `expires_at` rather than
/// the registered `iat` / `exp` claims, so the library's own expiry checks are
/// turned off and [`validate_claims`] runs against the caller's clock.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthError::Invalid(e.to_string())
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrincipalId, Role};
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(secret: &str, alg: Algorithm, claims: &JwtClaims) -> String {
        jsonwebtoken::encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret.as_bytes()))
            .unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            roles: vec![Role::new("clerk")],
            issued_at: now - Duration::seconds(5),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn round_trips_a_valid_token() {
        let now = Utc::now();
        let c = claims(now);
        let token = mint("s3cret", Algorithm::HS256, &c);

        let v = Hs256JwtValidator::new("s3cret");
        assert_eq!(v.validate(&token, now).unwrap(), c);
    }

    #[test]
    fn rejects_wrong_secret_and_algorithm() {
        let now = Utc::now();
        let c = claims(now);
        let v = Hs256JwtValidator::new("s3cret");

        let token = mint("other", Algorithm::HS256, &c);
        assert!(matches!(v.validate(&token, now), Err(AuthError::Invalid(_))));

        let token = mint("s3cret", Algorithm::HS512, &c);
        assert!(matches!(v.validate(&token, now), Err(AuthError::Invalid(_))));

        assert!(matches!(v.validate("not-a-jwt", now), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token_with_good_signature() {
        let now = Utc::now();
        let token = mint("s3cret", Algorithm::HS256, &claims(now));

        let v = Hs256JwtValidator::new("s3cret");
        let later = now + Duration::hours(1);
        assert_eq!(
            v.validate(&token, later),
            Err(AuthError::Claims(TokenValidationError::Expired))
        );
    }
}
