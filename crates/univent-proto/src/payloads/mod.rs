//! Request bodies and per-service domain types.
//!
//! Partial updates (`ProfileUpdate`, `EventUpdate`, `AnnouncementUpdate`) are
//! explicit builders: only fields that were set are serialized, so the wire
//! contract of a PATCH-like `PUT` is exactly the set of calls made on the
//! builder.

pub mod admin;
pub mod announcements;
pub mod auth;
pub mod events;
pub mod leaderboard;

pub use admin::RoleUpdate;
pub use announcements::{
    Announcement, AnnouncementPriority, AnnouncementQuery, AnnouncementUpdate, NewAnnouncement,
};
pub use auth::{
    ForgotPasswordRequest, LoginRequest, ProfileUpdate, RefreshTokenRequest, RegisterRequest,
};
pub use events::{Event, EventParticipant, EventUpdate, NewEvent, RegistrationDetails};
pub use leaderboard::{LeaderboardEntry, ScoreSubmission};
