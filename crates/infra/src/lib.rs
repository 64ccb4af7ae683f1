//! Infrastructure: the mock identity backend, session storage, and the
//! session manager that ties them to the token model.

pub mod identity_store;
pub mod session_manager;
pub mod session_store;
pub mod verifier;

pub use identity_store::{IdentityPatch, IdentityStore, InMemoryIdentityStore, LatencyProfile, NewIdentity};
pub use session_manager::{ChangeReason, IdentityChange, LoginError, SessionConfig, SessionManager};
pub use session_store::{
    DEFAULT_SESSION_KEY, FileSessionStore, InMemorySessionStore, SessionStore, SessionStoreError,
};
pub use verifier::StoreCredentialVerifier;
