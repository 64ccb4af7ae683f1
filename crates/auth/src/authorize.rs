//! Role-based access checks.

use thiserror::Error;

use crate::{Identity, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: role '{actual}' is not one of {required:?}")]
    Forbidden { required: Vec<Role>, actual: Role },
}

/// Gate access on an optional identity.
///
/// - No identity → `Unauthenticated`.
/// - `allowed` empty → any authenticated identity passes.
/// - Otherwise the identity's role must be listed.
///
/// Unlike [`Identity::has_any_role`], an empty list here means "no role
/// requirement", not "nobody".
pub fn authorize_any(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), AuthzError> {
    let identity = identity.ok_or(AuthzError::Unauthenticated)?;

    if allowed.is_empty() || identity.has_any_role(allowed) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            required: allowed.to_vec(),
            actual: identity.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::UserId;

    fn identity(role: Role) -> Identity {
        Identity {
            id: UserId::new(7),
            handle: "someone".to_string(),
            email: "someone@example.com".to_string(),
            display_name: "Someone".to_string(),
            role,
        }
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        assert_eq!(authorize_any(None, &[]), Err(AuthzError::Unauthenticated));
        assert_eq!(authorize_any(None, &[Role::User]), Err(AuthzError::Unauthenticated));
    }

    #[test]
    fn empty_requirement_admits_any_role() {
        for role in Role::ALL {
            assert_eq!(authorize_any(Some(&identity(role)), &[]), Ok(()));
        }
    }

    #[test]
    fn listed_role_is_admitted() {
        let manager = identity(Role::Manager);
        assert_eq!(authorize_any(Some(&manager), &[Role::Admin, Role::Manager]), Ok(()));
    }

    #[test]
    fn unlisted_role_is_forbidden() {
        let user = identity(Role::User);
        assert_eq!(
            authorize_any(Some(&user), &[Role::Admin, Role::Manager]),
            Err(AuthzError::Forbidden {
                required: vec![Role::Admin, Role::Manager],
                actual: Role::User,
            })
        );
    }

    #[test]
    fn has_any_role_with_empty_set_is_false() {
        assert!(!identity(Role::Admin).has_any_role(&[]));
    }
}
