//! Directory error model.

use thiserror::Error;

/// Result type used by the user directory and its callers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures of user-directory operations.
///
/// Session and token failures live in `portal-auth`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A profile field was rejected, e.g. `Invalid { field: "email", .. }`.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },

    #[error("User not found")]
    NotFound,

    /// Handles are unique across the directory.
    #[error("handle '{0}' is already taken")]
    HandleTaken(String),

    #[error("invalid user id: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }

    pub fn handle_taken(handle: impl Into<String>) -> Self {
        Self::HandleTaken(handle.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_is_user_facing() {
        assert_eq!(DomainError::NotFound.to_string(), "User not found");
        assert!(DomainError::NotFound.is_not_found());
    }

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            DomainError::handle_taken("admin").to_string(),
            "handle 'admin' is already taken"
        );
        assert_eq!(
            DomainError::invalid("email", "must contain '@'").to_string(),
            "invalid email: must contain '@'"
        );
    }
}
