//! Observable session state.
//!
//! A [`SessionState`] is published as one value, so a subscriber never sees
//! the user of one session next to the status of another.

use univent_proto::User;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// No credentials, or credentials were invalidated.
    #[default]
    Unauthenticated,
    /// A login or registration call is in flight.
    Authenticating,
    /// An access token is stored and has not been rejected.
    Authenticated,
}

/// Snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Lifecycle position.
    pub status: SessionStatus,
    /// Logged in account. `None` while a restored session is being
    /// validated.
    pub current_user: Option<User>,
    /// A session request is in flight.
    pub is_loading: bool,
}

impl SessionState {
    /// Authenticated with `user` (or with the user still being fetched).
    pub fn authenticated(user: Option<User>) -> Self {
        Self { status: SessionStatus::Authenticated, current_user: user, is_loading: false }
    }

    /// Whether the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// This state with a login in flight.
    pub(crate) fn authenticating(&self) -> Self {
        Self {
            status: SessionStatus::Authenticating,
            current_user: self.current_user.clone(),
            is_loading: true,
        }
    }

    /// This state with nothing in flight.
    pub(crate) fn settled(mut self) -> Self {
        if self.status == SessionStatus::Authenticating {
            self.status = SessionStatus::Unauthenticated;
        }
        self.is_loading = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_logged_out() {
        let state = SessionState::default();
        assert_eq!(state.status, SessionStatus::Unauthenticated);
        assert!(!state.is_authenticated());
        assert!(state.current_user.is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn authenticating_keeps_user_and_sets_loading() {
        let state = SessionState::authenticated(None).authenticating();
        assert_eq!(state.status, SessionStatus::Authenticating);
        assert!(state.is_loading);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn settled_never_leaves_authenticating() {
        let state = SessionState::default().authenticating().settled();
        assert_eq!(state, SessionState::default());

        let state = SessionState::authenticated(None).settled();
        assert!(state.is_authenticated());
    }
}
