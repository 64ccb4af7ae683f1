//! `portal-auth` — session token model and authorization checks.
//!
//! Pure types and functions: no storage, no clocks of its own (callers pass
//! `now`), no transport. The only async surface is the `CredentialVerifier`
//! seam implemented by infrastructure.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod roles;
pub mod token;
pub mod verifier;

pub use authorize::{AuthzError, authorize_any};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use identity::Identity;
pub use roles::{Role, UnknownRole};
pub use token::{TokenError, decode, encode};
pub use verifier::{AuthFailure, CredentialVerifier};
