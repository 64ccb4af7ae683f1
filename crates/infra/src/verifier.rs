//! Credential verification against the identity store.

use std::time::Duration;

use async_trait::async_trait;

use portal_auth::{AuthFailure, CredentialVerifier, Identity};

use crate::identity_store::IdentityStore;

/// Verifies handle/secret pairs with an [`IdentityStore`].
///
/// Each call waits out the login latency once, then looks the handle up and
/// compares the secret. Both failure cases collapse into
/// `AuthFailure::InvalidCredentials`.
#[derive(Debug)]
pub struct StoreCredentialVerifier<S> {
    store: S,
    latency: Duration,
}

impl<S> StoreCredentialVerifier<S> {
    pub fn new(store: S, latency: Duration) -> Self {
        Self { store, latency }
    }
}

#[async_trait]
impl<S> CredentialVerifier for StoreCredentialVerifier<S>
where
    S: IdentityStore,
{
    async fn verify(&self, handle: &str, secret: &str) -> Result<Identity, AuthFailure> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let Some(identity) = self.store.find_by_handle(handle).await else {
            tracing::debug!(handle, "credential check failed");
            return Err(AuthFailure::InvalidCredentials);
        };

        if !self.store.verify_secret(handle, secret).await {
            tracing::debug!(handle, "credential check failed");
            return Err(AuthFailure::InvalidCredentials);
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity_store::{InMemoryIdentityStore, LatencyProfile};
    use portal_auth::Role;

    fn verifier() -> StoreCredentialVerifier<InMemoryIdentityStore> {
        StoreCredentialVerifier::new(
            InMemoryIdentityStore::seeded(LatencyProfile::none()),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn valid_pair_returns_identity() {
        let identity = verifier().verify("manager", "manager123").await.unwrap();
        assert_eq!(identity.handle, "manager");
        assert_eq!(identity.display_name, "Manager User");
        assert_eq!(identity.role, Role::Manager);
    }

    #[tokio::test]
    async fn unknown_handle_and_wrong_secret_are_indistinguishable() {
        let verifier = verifier();
        let unknown = verifier.verify("ghost", "admin123").await.unwrap_err();
        let wrong = verifier.verify("admin", "wrong").await.unwrap_err();

        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), "Invalid username or password");
    }

    #[tokio::test(start_paused = true)]
    async fn verification_waits_for_login_latency() {
        let verifier = StoreCredentialVerifier::new(
            InMemoryIdentityStore::seeded(LatencyProfile::none()),
            Duration::from_millis(500),
        );
        let started = tokio::time::Instant::now();

        verifier.verify("admin", "admin123").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
