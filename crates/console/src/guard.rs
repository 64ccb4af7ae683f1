//! Navigation guard for the portal's routes.
//!
//! Route table:
//!
//! | path         | access                                  |
//! |--------------|-----------------------------------------|
//! | `""`         | redirects to `/dashboard`               |
//! | `/login`     | public                                  |
//! | `/dashboard` | authenticated                           |
//! | `/users`     | authenticated, role `admin` or `manager`|
//! | anything else| redirects to `/dashboard`               |
//!
//! A denied navigation always lands on `/login`, whether the visitor is
//! anonymous or merely lacks the role.

use std::fmt;
use std::sync::Arc;

use portal_auth::{AuthzError, CredentialVerifier, Role, authorize_any};
use portal_infra::{SessionManager, SessionStore};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Users,
}

impl Route {
    /// Map a path to its route. Empty and unknown paths resolve to the dashboard.
    pub fn resolve(path: &str) -> Route {
        match path.trim().trim_matches('/') {
            "login" => Route::Login,
            "users" => Route::Users,
            _ => Route::Dashboard,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Users => "/users",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Roles admitted to the route; empty means any authenticated user.
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Route::Users => &[Role::Admin, Role::Manager],
            Route::Login | Route::Dashboard => &[],
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(Route),
    Redirect { from: Route, to: Route },
}

impl GuardDecision {
    /// Where the user ends up.
    pub fn destination(&self) -> Route {
        match *self {
            GuardDecision::Allow(route) => route,
            GuardDecision::Redirect { to, .. } => to,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

pub struct RouteGuard<V, S> {
    session: Arc<SessionManager<V, S>>,
}

impl<V, S> Clone for RouteGuard<V, S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<V, S> RouteGuard<V, S>
where
    V: CredentialVerifier,
    S: SessionStore,
{
    pub fn new(session: Arc<SessionManager<V, S>>) -> Self {
        Self { session }
    }

    pub fn navigate(&self, path: &str) -> GuardDecision {
        self.check(Route::resolve(path))
    }

    pub fn check(&self, route: Route) -> GuardDecision {
        match self.authorize(route) {
            Ok(()) => GuardDecision::Allow(route),
            Err(e) => {
                tracing::info!(route = %route, reason = %e, "navigation redirected to login");
                GuardDecision::Redirect {
                    from: route,
                    to: Route::Login,
                }
            }
        }
    }

    /// Like [`check`](Self::check) but keeps the reason for a denial.
    pub fn authorize(&self, route: Route) -> Result<(), AuthzError> {
        if !route.requires_auth() {
            return Ok(());
        }
        if !self.session.is_authenticated() {
            return Err(AuthzError::Unauthenticated);
        }

        let identity = self.session.current_identity();
        authorize_any(identity.as_ref(), route.required_roles())
    }
}
