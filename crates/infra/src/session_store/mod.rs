//! Storage slot for the current session token.
//!
//! A store is bound to one well-known key and holds at most one token. Two
//! implementations with different scopes:
//!
//! - [`InMemorySessionStore`]: lives as long as the process ("tab" scope).
//!   Managers that share one `Arc` of it share the slot.
//! - [`FileSessionStore`]: a local-storage style JSON file. Survives restarts
//!   and is shared by every process pointing at the same path.

use std::sync::Arc;

use thiserror::Error;

pub mod file;
pub mod in_memory;

pub use file::FileSessionStore;
pub use in_memory::InMemorySessionStore;

/// Key the token is stored under unless configured otherwise.
pub const DEFAULT_SESSION_KEY: &str = "jwt_token";

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Single-slot token storage.
pub trait SessionStore: Send + Sync {
    /// Current token, if any.
    fn get(&self) -> Result<Option<String>, SessionStoreError>;

    /// Store `token`, replacing any previous value.
    fn set(&self, token: &str) -> Result<(), SessionStoreError>;

    /// Remove the token. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn get(&self) -> Result<Option<String>, SessionStoreError> {
        (**self).get()
    }

    fn set(&self, token: &str) -> Result<(), SessionStoreError> {
        (**self).set(token)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        (**self).clear()
    }
}
