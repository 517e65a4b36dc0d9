//! Admin service types.

use serde::{Deserialize, Serialize};

use crate::UserRole;

/// Body of `PUT /admin/users/{id}/role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdate {
    /// Role to grant.
    pub role: UserRole,
}
