use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use portal_core::UserId;

use crate::{Identity, Role, TokenError};

/// Claims carried in the session token.
///
/// The token is the only place session state lives; nothing else about the
/// identity is persisted. Field names on the wire match the web client's
/// token payload (`sub`, `username`, `role`, `exp`) and appear in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id as a decimal string.
    #[serde(rename = "sub")]
    pub subject: String,

    #[serde(rename = "username")]
    pub handle: String,

    pub role: Role,

    /// Expiry as unix seconds. The session is valid while `now < expires_at`.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token subject is not a user id: {0}")]
    InvalidSubject(String),
}

impl TokenClaims {
    /// Claims for a freshly authenticated identity, valid for `lifetime` from `now`.
    ///
    /// Fails with [`TokenError::ExpiryOutOfRange`] when `now + lifetime` is not
    /// a representable instant.
    pub fn issue(identity: &Identity, now: DateTime<Utc>, lifetime: Duration) -> Result<Self, TokenError> {
        let expires = now
            .checked_add_signed(lifetime)
            .ok_or(TokenError::ExpiryOutOfRange)?;

        Ok(Self {
            subject: identity.id.to_string(),
            handle: identity.handle.clone(),
            role: identity.role,
            expires_at: expires.timestamp(),
        })
    }

    /// `expires_at <= now` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }

    /// Seconds left before expiry, or `None` once expired.
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .checked_sub(now.timestamp())
            .filter(|remaining| *remaining > 0)
    }

    pub fn user_id(&self) -> Result<UserId, TokenValidationError> {
        self.subject
            .parse()
            .map_err(|_| TokenValidationError::InvalidSubject(self.subject.clone()))
    }

    /// Rebuild an identity from the claims alone.
    ///
    /// Lossy: the token does not carry email or display name, so they are
    /// synthesized from the handle (`<handle>@example.com`, display name =
    /// handle). Callers that need the real record must fetch it from the
    /// identity store.
    pub fn to_identity(&self) -> Result<Identity, TokenValidationError> {
        Ok(Identity {
            id: self.user_id()?,
            handle: self.handle.clone(),
            email: format!("{}@example.com", self.handle),
            display_name: self.handle.clone(),
            role: self.role,
        })
    }
}

/// Check that decoded claims describe a live session at `now`.
///
/// Structure is the codec's concern; this checks expiry and the subject.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.is_expired_at(now) {
        return Err(TokenValidationError::Expired);
    }
    claims.user_id()?;
    Ok(())
}
