use std::sync::{PoisonError, RwLock};

use super::{SessionStore, SessionStoreError};

/// Process-scoped token slot.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: RwLock<Option<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token` (restoring a session at startup).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.slot.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set(&self, token: &str) -> Result<(), SessionStoreError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
