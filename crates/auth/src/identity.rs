use serde::{Deserialize, Serialize};

use portal_core::UserId;

use crate::Role;

/// A portal user as seen by authorization decisions.
///
/// Handed out by value: callers get their own copy and can never reach back
/// into the identity store's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    /// Login name (`username` on the wire).
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
