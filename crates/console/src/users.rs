//! User management, reachable only through the `/users` route.

use portal_auth::{CredentialVerifier, Identity};
use portal_core::{DomainError, UserId};
use portal_infra::{IdentityPatch, IdentityStore, NewIdentity, SessionStore};

use crate::error::{ConsoleError, ConsoleResult};
use crate::guard::{Route, RouteGuard};

pub struct UserService<I, V, S> {
    store: I,
    guard: RouteGuard<V, S>,
}

impl<I, V, S> UserService<I, V, S>
where
    I: IdentityStore,
    V: CredentialVerifier,
    S: SessionStore,
{
    pub fn new(store: I, guard: RouteGuard<V, S>) -> Self {
        Self { store, guard }
    }

    pub async fn list(&self) -> ConsoleResult<Vec<Identity>> {
        self.guard.authorize(Route::Users)?;
        Ok(self.store.list().await)
    }

    pub async fn get(&self, id: UserId) -> ConsoleResult<Identity> {
        self.guard.authorize(Route::Users)?;
        self.store
            .get(id)
            .await
            .ok_or_else(|| DomainError::NotFound.into())
    }

    pub async fn create(&self, new: NewIdentity) -> ConsoleResult<Identity> {
        self.guard.authorize(Route::Users)?;
        Ok(self.store.create(new).await?)
    }

    pub async fn update(&self, id: UserId, patch: IdentityPatch) -> ConsoleResult<Identity> {
        self.guard.authorize(Route::Users)?;
        if patch.is_empty() {
            return Err(ConsoleError::EmptyPatch);
        }
        Ok(self.store.update(id, patch).await?)
    }

    pub async fn delete(&self, id: UserId) -> ConsoleResult<()> {
        self.guard.authorize(Route::Users)?;
        Ok(self.store.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use portal_auth::{AuthzError, Role};
    use portal_infra::{
        InMemoryIdentityStore, InMemorySessionStore, LatencyProfile, SessionManager,
        StoreCredentialVerifier,
    };

    type Verifier = StoreCredentialVerifier<Arc<InMemoryIdentityStore>>;
    type Service = UserService<Arc<InMemoryIdentityStore>, Verifier, InMemorySessionStore>;

    fn service() -> (Service, Arc<SessionManager<Verifier, InMemorySessionStore>>) {
        let identities = Arc::new(InMemoryIdentityStore::seeded(LatencyProfile::none()));
        let session = Arc::new(SessionManager::new(
            StoreCredentialVerifier::new(Arc::clone(&identities), Duration::ZERO),
            InMemorySessionStore::new(),
        ));
        let guard = RouteGuard::new(Arc::clone(&session));
        (UserService::new(identities, guard), session)
    }

    fn new_user(handle: &str) -> NewIdentity {
        NewIdentity {
            handle: handle.to_string(),
            email: format!("{handle}@example.com"),
            display_name: "New Person".to_string(),
            role: Role::User,
            secret: Some("s3cret".to_string()),
        }
    }

    #[tokio::test]
    async fn anonymous_caller_is_rejected() {
        let (users, _) = service();

        let err = users.list().await.unwrap_err();
        assert!(matches!(err, ConsoleError::Authz(AuthzError::Unauthenticated)));
    }

    #[tokio::test]
    async fn plain_user_is_forbidden() {
        let (users, session) = service();
        session.login("user", "user123").await.unwrap();

        let err = users.get(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Authz(AuthzError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn manager_runs_the_full_lifecycle() {
        let (users, session) = service();
        session.login("manager", "manager123").await.unwrap();

        let created = users.create(new_user("dana")).await.unwrap();
        assert_eq!(created.id, UserId::new(4));

        let patch = IdentityPatch {
            display_name: Some("Dana D.".to_string()),
            ..IdentityPatch::default()
        };
        let updated = users.update(created.id, patch).await.unwrap();
        assert_eq!(updated.display_name, "Dana D.");
        assert_eq!(updated.email, "dana@example.com");

        users.delete(created.id).await.unwrap();
        let err = users.get(created.id).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn created_user_can_log_in() {
        let (users, session) = service();
        session.login("admin", "admin123").await.unwrap();
        users.create(new_user("erin")).await.unwrap();

        let identity = session.login("erin", "s3cret").await.unwrap();
        assert_eq!(identity.handle, "erin");
    }

    #[tokio::test]
    async fn empty_patch_is_refused() {
        let (users, session) = service();
        session.login("admin", "admin123").await.unwrap();

        let err = users.update(UserId::new(2), IdentityPatch::default()).await.unwrap_err();
        assert!(matches!(err, ConsoleError::EmptyPatch));
    }
}
