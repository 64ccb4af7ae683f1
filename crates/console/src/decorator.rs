//! Attaches the session token to outgoing API requests.

use std::sync::Arc;

use portal_auth::CredentialVerifier;
use portal_infra::{SessionManager, SessionStore};

pub struct RequestDecorator<V, S> {
    session: Arc<SessionManager<V, S>>,
}

impl<V, S> Clone for RequestDecorator<V, S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<V, S> RequestDecorator<V, S>
where
    V: CredentialVerifier,
    S: SessionStore,
{
    pub fn new(session: Arc<SessionManager<V, S>>) -> Self {
        Self { session }
    }

    /// The token to send, only while the session is live.
    pub fn bearer_token(&self) -> Option<String> {
        if !self.session.is_authenticated() {
            return None;
        }
        self.session.get_token()
    }

    /// `Authorization` header value, e.g. `Bearer eyJ...`.
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer_token().map(|token| format!("Bearer {token}"))
    }

    /// Add `Authorization: Bearer <token>` when a live session exists; the
    /// request is passed through untouched otherwise.
    pub fn decorate(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use portal_auth::{Role, TokenClaims};
    use portal_infra::{
        InMemoryIdentityStore, InMemorySessionStore, LatencyProfile, StoreCredentialVerifier,
    };
    use reqwest::header::AUTHORIZATION;

    type Session = SessionManager<StoreCredentialVerifier<InMemoryIdentityStore>, Arc<InMemorySessionStore>>;

    fn session(store: Arc<InMemorySessionStore>) -> Arc<Session> {
        Arc::new(SessionManager::new(
            StoreCredentialVerifier::new(
                InMemoryIdentityStore::seeded(LatencyProfile::none()),
                Duration::ZERO,
            ),
            store,
        ))
    }

    fn outgoing(decorator: &RequestDecorator<StoreCredentialVerifier<InMemoryIdentityStore>, Arc<InMemorySessionStore>>) -> reqwest::Request {
        let client = reqwest::Client::new();
        decorator
            .decorate(client.get("http://localhost:8080/api/users"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn live_session_adds_bearer_header() {
        let store = Arc::new(InMemorySessionStore::new());
        let session = session(Arc::clone(&store));
        session.login("admin", "admin123").await.unwrap();
        let decorator = RequestDecorator::new(session);

        let token = store.get().unwrap().unwrap();
        let req = outgoing(&decorator);

        assert_eq!(
            req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap(),
            format!("Bearer {token}")
        );
        assert_eq!(decorator.authorization_header(), Some(format!("Bearer {token}")));
    }

    #[tokio::test]
    async fn anonymous_request_is_untouched() {
        let decorator = RequestDecorator::new(session(Arc::new(InMemorySessionStore::new())));

        assert!(outgoing(&decorator).headers().get(AUTHORIZATION).is_none());
        assert_eq!(decorator.authorization_header(), None);
    }

    #[tokio::test]
    async fn expired_token_is_not_sent() {
        let store = Arc::new(InMemorySessionStore::new());
        let decorator = RequestDecorator::new(session(Arc::clone(&store)));
        let stale = portal_auth::encode(&TokenClaims {
            subject: "1".to_string(),
            handle: "admin".to_string(),
            role: Role::Admin,
            expires_at: Utc::now().timestamp() - 10,
        })
        .unwrap();
        store.set(&stale).unwrap();

        assert!(outgoing(&decorator).headers().get(AUTHORIZATION).is_none());
        assert_eq!(store.get().unwrap(), None);
    }
}
