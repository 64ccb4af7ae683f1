//! Session lifecycle: login, logout, and "who is signed in right now".
//!
//! The manager owns one conceptual variable, the current identity, which is
//! either anonymous (`None`) or authenticated (`Some(identity)`). The stored
//! token is the source of truth; the identity is derived from it.
//!
//! ```text
//! login(handle, secret)
//!   ↓
//! 1. CredentialVerifier::verify      (suspends on simulated latency)
//!   ↓
//! 2. TokenClaims::issue              (expires_at = now + lifetime)
//!   ↓
//! 3. token::encode → SessionStore::set
//!   ↓
//! 4. current = Some(identity) → publish IdentityChange
//! ```
//!
//! ## Queries
//!
//! `is_authenticated`, `has_role` and `has_any_role` re-read the store on every
//! call and never fail. A token that does not decode, or whose expiry has
//! passed, is discarded from the store and the manager drops to anonymous.
//!
//! ## Concurrency
//!
//! Login and logout are not serialized. If a login is still waiting on the
//! verifier when `logout` runs, the login completes afterwards and the session
//! ends up authenticated: the last completed mutation wins. Wrap calls in a
//! lock at the call site if that matters.
//!
//! ## Notifications
//!
//! Changes are broadcast to the subscribers registered at that moment. There is
//! no replay; a new subscriber reads `current_identity()` for the present state.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use portal_auth::{
    AuthFailure, CredentialVerifier, Identity, Role, TokenClaims, TokenError, validate_claims,
};
use portal_events::{EventBus, InMemoryEventBus, Subscription, SubscriptionId};

use crate::session_store::{SessionStore, SessionStoreError};

/// Session tuning.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long an issued token stays valid. There is no refresh.
    pub token_lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_lifetime: Duration::seconds(3600),
        }
    }
}

/// Why the current identity changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChangeReason {
    Login,
    Logout,
    /// The stored token reached its expiry.
    Expired,
    /// The stored token was unreadable or removed behind the manager's back.
    Invalidated,
    /// The shared slot now holds a token for a different identity.
    Restored,
}

/// Broadcast on every identity transition. `identity: None` means signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityChange {
    pub identity: Option<Identity>,
    pub reason: ChangeReason,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    #[error("session token could not be issued: {0}")]
    Token(#[from] TokenError),

    #[error("session could not be saved: {0}")]
    Storage(#[from] SessionStoreError),
}

impl LoginError {
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, LoginError::Auth(AuthFailure::InvalidCredentials))
    }
}

/// Why a stored token does not describe a live session.
enum Dead {
    Expired,
    Malformed(String),
}

/// Owns the session for one storage slot.
///
/// Construct one per slot and share it (`Arc<SessionManager<..>>`) with route
/// guards, request decorators and the UI.
#[derive(Debug)]
pub struct SessionManager<V, S> {
    verifier: V,
    store: S,
    config: SessionConfig,
    current: RwLock<Option<Identity>>,
    bus: InMemoryEventBus<IdentityChange>,
}

impl<V, S> SessionManager<V, S>
where
    V: CredentialVerifier,
    S: SessionStore,
{
    pub fn new(verifier: V, store: S) -> Self {
        Self::with_config(verifier, store, SessionConfig::default())
    }

    /// Build the manager and restore any session already in `store`.
    ///
    /// A stored token that is unreadable or expired is cleared and the manager
    /// starts anonymous.
    pub fn with_config(verifier: V, store: S, config: SessionConfig) -> Self {
        let manager = Self {
            verifier,
            store,
            config,
            current: RwLock::new(None),
            bus: InMemoryEventBus::new(),
        };

        if let Some(claims) = manager.live_claims(Utc::now()) {
            match claims.to_identity() {
                Ok(identity) => {
                    tracing::info!(user_id = %identity.id, handle = %identity.handle, "session restored from storage");
                    manager.replace_current(Some(identity));
                }
                Err(e) => manager.discard(&e.to_string()),
            }
        }

        manager
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Verify credentials, issue a token, persist it, and announce the identity.
    ///
    /// On any failure the session is left exactly as it was.
    pub async fn login(&self, handle: &str, secret: &str) -> Result<Identity, LoginError> {
        let identity = match self.verifier.verify(handle, secret).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::info!(handle, "login rejected");
                return Err(e.into());
            }
        };

        let claims = TokenClaims::issue(&identity, Utc::now(), self.config.token_lifetime)?;
        let token = portal_auth::encode(&claims)?;
        self.store.set(&token)?;

        tracing::info!(
            user_id = %identity.id,
            handle = %identity.handle,
            role = %identity.role,
            expires_at = claims.expires_at,
            "login succeeded"
        );
        self.transition(Some(identity.clone()), ChangeReason::Login);

        Ok(identity)
    }

    /// Clear the stored token and announce the sign-out.
    ///
    /// The in-memory state becomes anonymous even if clearing storage fails;
    /// the storage error is returned so the caller can report it.
    pub fn logout(&self) -> Result<(), SessionStoreError> {
        let cleared = self.store.clear();
        if let Err(e) = &cleared {
            tracing::warn!(error = %e, "failed to clear stored session token");
        }

        tracing::info!("logged out");
        self.transition(None, ChangeReason::Logout);
        cleared
    }

    /// The raw stored token, if any. Not validated.
    pub fn get_token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; treating as signed out");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    /// True iff a stored token decodes and `expires_at > now`.
    ///
    /// Decoding is stricter than an expiry-only check: a token whose `role` is
    /// not a known [`Role`] or whose `sub` is not a numeric user id counts as
    /// malformed, so it is discarded even when `exp` is still in the future.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.live_identity(now).is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.live_identity(Utc::now())
            .is_some_and(|identity| identity.has_role(role))
    }

    /// True iff authenticated and the role is one of `roles` (never for an
    /// empty slice).
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.live_identity(Utc::now())
            .is_some_and(|identity| identity.has_any_role(roles))
    }

    /// Identity held by the manager, without re-checking the token.
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Claims of the stored token if it is still live at `now`.
    pub fn current_claims_at(&self, now: DateTime<Utc>) -> Option<TokenClaims> {
        self.live_claims(now)
    }

    /// Register for identity changes published from now on.
    pub fn subscribe(&self) -> Subscription<IdentityChange> {
        self.bus.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// The current identity after reconciling with the stored token.
    ///
    /// Drops to anonymous if the token is gone or dead. If the shared slot now
    /// holds a different user's token (another manager logged in), the identity
    /// is rebuilt from that token.
    fn live_identity(&self, now: DateTime<Utc>) -> Option<Identity> {
        let Some(claims) = self.live_claims(now) else {
            if self.current_identity().is_some() {
                self.transition(None, ChangeReason::Invalidated);
            }
            return None;
        };

        let current = self.current_identity();
        if let Some(identity) = current.filter(|i| same_session(i, &claims)) {
            return Some(identity);
        }

        match claims.to_identity() {
            Ok(identity) => {
                self.transition(Some(identity.clone()), ChangeReason::Restored);
                Some(identity)
            }
            Err(e) => {
                self.discard(&e.to_string());
                None
            }
        }
    }

    /// Decode and validate the stored token; dead tokens are discarded here.
    fn live_claims(&self, now: DateTime<Utc>) -> Option<TokenClaims> {
        let token = match self.store.get() {
            Ok(token) => token?,
            Err(SessionStoreError::Json(e)) => {
                self.discard(&format!("session storage is not valid JSON: {e}"));
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; treating as signed out");
                return None;
            }
        };

        match check(&token, now) {
            Ok(claims) => Some(claims),
            Err(Dead::Expired) => {
                tracing::info!("session token expired");
                self.clear_quietly();
                if self.current_identity().is_some() {
                    self.transition(None, ChangeReason::Expired);
                }
                None
            }
            Err(Dead::Malformed(reason)) => {
                self.discard(&reason);
                None
            }
        }
    }

    fn discard(&self, reason: &str) {
        tracing::warn!(reason, "discarding unusable session token");
        self.clear_quietly();
        if self.current_identity().is_some() {
            self.transition(None, ChangeReason::Invalidated);
        }
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored session token");
        }
    }

    fn replace_current(&self, next: Option<Identity>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn transition(&self, next: Option<Identity>, reason: ChangeReason) {
        self.replace_current(next.clone());

        let change = IdentityChange {
            identity: next,
            reason,
        };
        match self.bus.publish(change) {
            Ok(delivered) => tracing::debug!(?reason, delivered, "identity change published"),
            Err(e) => tracing::warn!(?reason, error = ?e, "identity change not published"),
        }
    }
}

fn check(token: &str, now: DateTime<Utc>) -> Result<TokenClaims, Dead> {
    let claims = portal_auth::decode(token).map_err(|e| Dead::Malformed(e.to_string()))?;
    match validate_claims(&claims, now) {
        Ok(()) => Ok(claims),
        Err(portal_auth::TokenValidationError::Expired) => Err(Dead::Expired),
        Err(e) => Err(Dead::Malformed(e.to_string())),
    }
}

fn same_session(identity: &Identity, claims: &TokenClaims) -> bool {
    claims.user_id().is_ok_and(|id| id == identity.id)
        && identity.handle == claims.handle
        && identity.role == claims.role
}
