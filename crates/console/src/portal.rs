//! Wiring of the session subsystem into one handle.

use std::sync::Arc;

use portal_infra::{
    InMemoryIdentityStore, LatencyProfile, SessionConfig, SessionManager, SessionStore,
    StoreCredentialVerifier,
};

use crate::decorator::RequestDecorator;
use crate::guard::RouteGuard;
use crate::users::UserService;

pub type PortalVerifier = StoreCredentialVerifier<Arc<InMemoryIdentityStore>>;
pub type PortalSession<S> = SessionManager<PortalVerifier, S>;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PortalOptions {
    pub latency: LatencyProfile,
    pub session: SessionConfig,
}

impl PortalOptions {
    /// No simulated delays; handy for scripts and tests.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::none(),
            session: SessionConfig::default(),
        }
    }
}

/// One seeded identity directory and one session over `S`.
pub struct Portal<S> {
    identities: Arc<InMemoryIdentityStore>,
    session: Arc<PortalSession<S>>,
}

impl<S> Portal<S>
where
    S: SessionStore,
{
    pub fn new(store: S, options: PortalOptions) -> Self {
        let identities = Arc::new(InMemoryIdentityStore::seeded(options.latency));
        let verifier = StoreCredentialVerifier::new(Arc::clone(&identities), options.latency.login);
        let session = Arc::new(SessionManager::with_config(verifier, store, options.session));

        Self {
            identities,
            session,
        }
    }

    pub fn session(&self) -> &Arc<PortalSession<S>> {
        &self.session
    }

    pub fn guard(&self) -> RouteGuard<PortalVerifier, S> {
        RouteGuard::new(Arc::clone(&self.session))
    }

    pub fn decorator(&self) -> RequestDecorator<PortalVerifier, S> {
        RequestDecorator::new(Arc::clone(&self.session))
    }

    pub fn users(&self) -> UserService<Arc<InMemoryIdentityStore>, PortalVerifier, S> {
        UserService::new(Arc::clone(&self.identities), self.guard())
    }
}
