//! Command set of the `univent` binary.
//!
//! Each command runs against a [`Services`] bundle and returns the text to
//! print. Request failures from the domain services are reported to the
//! session first, so an authorization failure ends the stored session the
//! same way it would in a long-running client.

use std::fmt::Write as _;

use clap::Subcommand;
use thiserror::Error;
use tracing::info;
use univent_client::Transport;
use univent_proto::{
    User, UserRole,
    payloads::{
        Announcement, AnnouncementPriority, AnnouncementQuery, Event, LeaderboardEntry,
        ProfileUpdate, RegisterRequest, RegistrationDetails, ScoreSubmission,
    },
};
use univent_services::{
    AdminService, AnnouncementService, EventService, LeaderboardService, ServiceError,
};
use univent_session::{SessionError, SessionManager};
use univent_store::CredentialStore;

/// Errors a command can end with.
#[derive(Error, Debug)]
pub enum CliError {
    /// Session operation failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Domain service operation failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Command needs a logged in user
    #[error("not logged in")]
    NotLoggedIn,

    /// Arguments were accepted by the parser but say nothing to do
    #[error("{0}")]
    Usage(&'static str),

    /// Background logout notification did not finish
    #[error("logout notification aborted: {0}")]
    Aborted(String),
}

/// Commands understood by the client.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Log in and store the session tokens
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Create an account and log in as it
    Register {
        /// Given name
        #[arg(long)]
        first_name: String,
        /// Family name
        #[arg(long)]
        last_name: String,
        /// Login email
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
        /// College
        #[arg(long)]
        college: String,
    },
    /// Forget the stored session and tell the server
    Logout,
    /// Show the logged in account
    Whoami,
    /// Change profile fields of the logged in account
    UpdateProfile {
        /// New given name
        #[arg(long)]
        first_name: Option<String>,
        /// New family name
        #[arg(long)]
        last_name: Option<String>,
        /// New college
        #[arg(long)]
        college: Option<String>,
    },
    /// Ask for a password reset email
    ForgotPassword {
        /// Account email
        email: String,
    },
    /// Exchange the refresh token for a new access token
    Refresh,
    /// List events, earliest first
    Events,
    /// Register for an event
    Join {
        /// Event identifier
        event_id: String,
        /// Anything the organizers should know
        #[arg(long)]
        special_requirements: Option<String>,
    },
    /// Cancel a registration
    Cancel {
        /// Event identifier
        event_id: String,
    },
    /// List the participants of an event
    Participants {
        /// Event identifier
        event_id: String,
    },
    /// List published announcements, newest first
    Announcements {
        /// Only announcements for this event
        #[arg(long)]
        event_id: Option<String>,
        /// Only announcements with this priority
        #[arg(long, value_parser = parse_priority)]
        priority: Option<AnnouncementPriority>,
    },
    /// Show the overall top performers or one event's board
    Leaderboard {
        /// Show this event's board instead of the overall one
        #[arg(long)]
        event_id: Option<String>,
        /// Number of top performers
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Record a score for a participant
    SubmitScore {
        /// Event identifier
        event_id: String,
        /// Participant identifier
        user_id: String,
        /// Score
        score: i64,
    },
    /// List every account (admins only)
    Users,
    /// Change an account's role (admins only)
    SetRole {
        /// Account identifier
        user_id: String,
        /// New role
        #[arg(value_parser = parse_role)]
        role: UserRole,
    },
}

/// Parse an announcement priority by its wire name.
///
/// # Errors
///
/// Returns a message listing the accepted names.
pub fn parse_priority(raw: &str) -> Result<AnnouncementPriority, String> {
    [AnnouncementPriority::Low, AnnouncementPriority::Medium, AnnouncementPriority::High]
        .into_iter()
        .find(|priority| priority.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown priority {raw:?}, expected low, medium or high"))
}

/// Parse a role by its wire name.
///
/// # Errors
///
/// Returns a message listing the accepted names.
pub fn parse_role(raw: &str) -> Result<UserRole, String> {
    UserRole::ALL
        .into_iter()
        .find(|role| role.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown role {raw:?}, expected participant, organizer or admin"))
}

/// Session plus every domain service, sharing one dispatcher.
pub struct Services<S: CredentialStore, T: Transport> {
    session: SessionManager<S, T>,
    events: EventService<S, T>,
    announcements: AnnouncementService<S, T>,
    leaderboard: LeaderboardService<S, T>,
    admin: AdminService<S, T>,
}

impl<S: CredentialStore, T: Transport> Services<S, T> {
    /// Wire the domain services to `session`'s dispatcher.
    pub fn new(session: SessionManager<S, T>) -> Self {
        let dispatcher = session.dispatcher().clone();
        Self {
            events: EventService::new(dispatcher.clone()),
            announcements: AnnouncementService::new(dispatcher.clone()),
            leaderboard: LeaderboardService::new(dispatcher),
            admin: AdminService::new(session.clone()),
            session,
        }
    }

    /// Session the services report to.
    pub fn session(&self) -> &SessionManager<S, T> {
        &self.session
    }

    /// Run one command and return its output.
    ///
    /// # Errors
    ///
    /// Whatever the underlying session or service operation returns, or
    /// `NotLoggedIn` for commands that need an account.
    pub async fn run(&self, command: Command) -> Result<String, CliError> {
        match command {
            Command::Login { email, password } => {
                let user = self.session.login(&email, &password).await?;
                Ok(format!("logged in as {}", describe_user(&user)))
            },
            Command::Register { first_name, last_name, email, password, college } => {
                let request = RegisterRequest { first_name, last_name, email, password, college };
                let user = self.session.register(&request).await?;
                Ok(format!("registered {}", describe_user(&user)))
            },
            Command::Logout => self.logout().await,
            Command::Whoami => Ok(describe_user(&self.require_user().await?)),
            Command::UpdateProfile { first_name, last_name, college } => {
                let mut update = ProfileUpdate::new();
                if let Some(value) = first_name {
                    update = update.first_name(value);
                }
                if let Some(value) = last_name {
                    update = update.last_name(value);
                }
                if let Some(value) = college {
                    update = update.college(value);
                }
                if update.is_empty() {
                    return Err(CliError::Usage("nothing to update"));
                }

                self.require_user().await?;
                let user = self.session.update_profile(&update).await?;
                Ok(format!("updated {}", describe_user(&user)))
            },
            Command::ForgotPassword { email } => Ok(self.session.forgot_password(&email).await?),
            Command::Refresh => {
                self.session.refresh_access_token().await?;
                Ok("access token refreshed".to_string())
            },
            Command::Events => {
                let events = self.reported(self.events.fetch_events().await)?;
                Ok(render(&events, "no events", describe_event))
            },
            Command::Join { event_id, special_requirements } => {
                let details = RegistrationDetails { special_requirements, ..Default::default() };
                self.reported(self.events.register_for_event(&event_id, &details).await)?;
                Ok(format!("registered for {event_id}"))
            },
            Command::Cancel { event_id } => {
                self.reported(self.events.cancel_registration(&event_id).await)?;
                Ok(format!("cancelled registration for {event_id}"))
            },
            Command::Participants { event_id } => {
                let participants = self.reported(self.events.participants(&event_id).await)?;
                Ok(render(&participants, "no participants", |participant| {
                    match &participant.email {
                        Some(email) => format!("{} <{email}>", participant.name),
                        None => participant.name.clone(),
                    }
                }))
            },
            Command::Announcements { event_id, priority } => {
                let query = AnnouncementQuery { event_id, priority };
                let announcements =
                    self.reported(self.announcements.fetch_announcements(&query).await)?;
                Ok(render(&announcements, "no announcements", describe_announcement))
            },
            Command::Leaderboard { event_id, limit } => {
                let entries = match event_id {
                    Some(id) => self.leaderboard.fetch_event_leaderboard(&id).await,
                    None => self.leaderboard.fetch_top_performers(limit).await,
                };
                let entries = self.reported(entries)?;
                Ok(render(&entries, "no scores yet", describe_entry))
            },
            Command::SubmitScore { event_id, user_id, score } => {
                let submission = ScoreSubmission { user_id, score };
                let entry =
                    self.reported(self.leaderboard.submit_score(&event_id, &submission).await)?;
                Ok(entry.map_or_else(|| "score submitted".to_string(), |e| describe_entry(&e)))
            },
            Command::Users => {
                self.require_user().await?;
                let users = self.admin.fetch_all_users().await?;
                Ok(render(&users, "no users", describe_user))
            },
            Command::SetRole { user_id, role } => {
                self.require_user().await?;
                let user = self.admin.update_user_role(&user_id, role).await?;
                Ok(format!("updated {}", describe_user(&user)))
            },
        }
    }

    async fn logout(&self) -> Result<String, CliError> {
        let was_authenticated = self.session.is_authenticated();

        // Wait for the notification so the process does not exit under it.
        if let Some(notification) = self.session.logout() {
            notification.await.map_err(|e| CliError::Aborted(e.to_string()))?;
        }

        info!(was_authenticated, "logged out");
        Ok(if was_authenticated { "logged out" } else { "not logged in" }.to_string())
    }

    /// Logged in user, fetched from the server if only a token is known.
    async fn require_user(&self) -> Result<User, CliError> {
        if let Some(user) = self.session.current_user() {
            return Ok(user);
        }
        if !self.session.is_authenticated() {
            return Err(CliError::NotLoggedIn);
        }
        self.session.refresh_current_user().await.ok_or(CliError::NotLoggedIn)
    }

    /// Pass a service result through, ending the session on authorization
    /// failures.
    fn reported<R>(&self, result: Result<R, ServiceError>) -> Result<R, CliError> {
        if let Err(ServiceError::Request(e)) = &result {
            self.session.observe_error(e);
        }
        Ok(result?)
    }
}

fn render<T>(items: &[T], empty: &str, describe: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }

    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "{}", describe(item));
    }
    out.truncate(out.trim_end().len());
    out
}

fn describe_user(user: &User) -> String {
    format!("{} <{}> [{}] {}", user.full_name(), user.email, user.role, user.id)
}

fn describe_event(event: &Event) -> String {
    format!(
        "{}  {}  {} @ {} ({} places)",
        event.date.format("%Y-%m-%d %H:%M"),
        event.id,
        event.title,
        event.location,
        event.capacity
    )
}

fn describe_announcement(announcement: &Announcement) -> String {
    format!(
        "{}  [{}] {}: {}",
        announcement.created_at.format("%Y-%m-%d"),
        announcement.priority,
        announcement.title,
        announcement.content
    )
}

fn describe_entry(entry: &LeaderboardEntry) -> String {
    let rank = entry.rank_label();
    let rank = if rank.is_empty() { "-".to_string() } else { rank };
    format!("{rank:>4}  {}  {}", entry.user_name, entry.display_score())
}
