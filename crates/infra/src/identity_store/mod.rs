//! User directory backing login and user management.
//!
//! The directory is the system of record for identities and their secrets.
//! Secrets never leave it: the only way to use one is `verify_secret`.
//!
//! Every management call is wrapped in a simulated network delay so callers
//! behave as they would against a remote API (see [`LatencyProfile`]).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use portal_auth::{Identity, Role};
use portal_core::{DomainResult, UserId};

pub mod in_memory;

pub use in_memory::InMemoryIdentityStore;

/// Simulated round-trip delays of the mock backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LatencyProfile {
    pub login: Duration,
    pub list: Duration,
    pub get: Duration,
    /// Applies to create, update and delete.
    pub write: Duration,
}

impl LatencyProfile {
    /// No delays at all (tests, scripted use).
    pub const fn none() -> Self {
        Self {
            login: Duration::ZERO,
            list: Duration::ZERO,
            get: Duration::ZERO,
            write: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(500),
            list: Duration::from_millis(300),
            get: Duration::from_millis(200),
            write: Duration::from_millis(300),
        }
    }
}

/// Input for creating a user. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentity {
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Initial secret. Without one the user exists but cannot log in.
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPatch {
    pub handle: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Identity backend used by the credential verifier and the management UI.
///
/// Lookups used by login (`find_by_handle`, `verify_secret`) are immediate;
/// login latency is applied once by the verifier. CRUD calls carry their own
/// delay.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_handle(&self, handle: &str) -> Option<Identity>;

    /// Plain equality against the stored secret. `false` for unknown handles.
    async fn verify_secret(&self, handle: &str, secret: &str) -> bool;

    /// All users in insertion order.
    async fn list(&self) -> Vec<Identity>;

    async fn get(&self, id: UserId) -> Option<Identity>;

    /// Assigns `max(id) + 1` (or 1 for an empty directory).
    async fn create(&self, new: NewIdentity) -> DomainResult<Identity>;

    async fn update(&self, id: UserId, patch: IdentityPatch) -> DomainResult<Identity>;

    async fn delete(&self, id: UserId) -> DomainResult<()>;
}

#[async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn find_by_handle(&self, handle: &str) -> Option<Identity> {
        (**self).find_by_handle(handle).await
    }

    async fn verify_secret(&self, handle: &str, secret: &str) -> bool {
        (**self).verify_secret(handle, secret).await
    }

    async fn list(&self) -> Vec<Identity> {
        (**self).list().await
    }

    async fn get(&self, id: UserId) -> Option<Identity> {
        (**self).get(id).await
    }

    async fn create(&self, new: NewIdentity) -> DomainResult<Identity> {
        (**self).create(new).await
    }

    async fn update(&self, id: UserId, patch: IdentityPatch) -> DomainResult<Identity> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: UserId) -> DomainResult<()> {
        (**self).delete(id).await
    }
}
