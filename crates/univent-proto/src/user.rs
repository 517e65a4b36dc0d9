//! Account value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role granted to an account. Serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can browse and register for events.
    Participant,
    /// Can create and manage events.
    Organizer,
    /// Full access, including user management.
    Admin,
}

impl UserRole {
    /// All roles, lowest privilege first.
    pub const ALL: [Self; 3] = [Self::Participant, Self::Organizer, Self::Admin];

    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }

    /// Human readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Participant => "Participant",
            Self::Organizer => "Organizer",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as returned by the auth and admin services.
///
/// Immutable: a session replaces the whole value whenever the backend returns
/// a newer copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend identifier.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// College the account belongs to.
    pub college: String,
    /// Granted role.
    pub role: UserRole,
}

impl User {
    /// `"{first_name} {last_name}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the account is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Organizers and administrators both count as organizers.
    pub fn is_organizer(&self) -> bool {
        matches!(self.role, UserRole::Organizer | UserRole::Admin)
    }

    /// Whether the account may create events.
    pub fn can_create_events(&self) -> bool {
        self.is_organizer()
    }
}
