//! `gameshop-auth` — bearer token authentication boundary.
//!
//! Decoupled from HTTP and storage: the API layer extracts the token, this
//! crate verifies it and yields the claims.

pub mod claims;
pub mod principal;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use principal::{PrincipalId, Role};
pub use validator::{AuthError, Hs256JwtValidator, JwtValidator};
