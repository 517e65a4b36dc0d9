//! Domain service clients for Univent
//!
//! Thin consumers of [`univent_client::Dispatcher`]: every operation is one
//! dispatched request, and each service keeps the last fetched collection
//! in an observable [`Listing`].
//!
//! - [`EventService`]: event catalogue, registrations, participants
//! - [`AnnouncementService`]: announcement feed
//! - [`LeaderboardService`]: rankings and score submission
//! - [`AdminService`]: user administration, gated on the session's role

#![forbid(unsafe_code)]

mod admin;
mod announcements;
mod error;
mod events;
mod leaderboard;
mod listing;

pub use admin::AdminService;
pub use announcements::AnnouncementService;
pub use error::ServiceError;
pub use events::EventService;
pub use leaderboard::LeaderboardService;
pub use listing::Listing;

/// Percent-encode a value used as one path segment.
fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}
