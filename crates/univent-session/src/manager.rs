//! Session manager.
//!
//! Drives the auth endpoints and keeps three things consistent: the tokens in
//! the credential store, the published [`SessionState`], and what the server
//! last said about those tokens.
//!
//! # Transitions
//!
//! - login/register: `Authenticating` while in flight, then `Authenticated`
//!   with both tokens stored, or back to the previous state on failure
//! - logout: tokens deleted and state cleared unconditionally; the server is
//!   notified in the background with the token captured beforehand
//! - any authorization failure on a session request: full local logout
//! - restore: `Authenticated` without a user if a token is stored, confirmed
//!   or revoked by a later `GET /auth/me`
//!
//! # Epochs
//!
//! Every transition that replaces or destroys the session advances an epoch.
//! Requests issued on behalf of the session capture the epoch first and only
//! publish or end anything if it is unchanged when the reply arrives, so a
//! late reply can never touch a session it was not sent for.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};
use univent_client::{Dispatcher, PreparedRequest, RequestError, RequestSpec, Transport, services};
use univent_proto::{
    Envelope, TokenRefreshResponse, User,
    payloads::{
        ForgotPasswordRequest, LoginRequest, ProfileUpdate, RefreshTokenRequest, RegisterRequest,
    },
};
use univent_store::{ACCESS_TOKEN, CredentialStore, REFRESH_TOKEN};

use crate::{SessionError, SessionState};

/// Owner of the session state.
///
/// Explicitly constructed and injected; clones share the same state channel
/// and dispatcher, so a clone can be moved into a background task.
pub struct SessionManager<S: CredentialStore, T: Transport> {
    dispatcher: Dispatcher<S, T>,
    state: Arc<watch::Sender<SessionState>>,
    epoch: Arc<AtomicU64>,
}

impl<S: CredentialStore, T: Transport> Clone for SessionManager<S, T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            state: Arc::clone(&self.state),
            epoch: Arc::clone(&self.epoch),
        }
    }
}

impl<S: CredentialStore, T: Transport> SessionManager<S, T> {
    /// Create a manager in the unauthenticated state.
    ///
    /// Stored credentials are not looked at until [`Self::restore`] or
    /// [`Self::start`].
    pub fn new(dispatcher: Dispatcher<S, T>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { dispatcher, state: Arc::new(state), epoch: Arc::new(AtomicU64::new(0)) }
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Whether the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Logged in account, if known.
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    /// Dispatcher used for session requests, shared with domain services.
    pub fn dispatcher(&self) -> &Dispatcher<S, T> {
        &self.dispatcher
    }

    /// Optimistically resume a session from stored credentials.
    ///
    /// Publishes `Authenticated` with no user and returns `true` if an access
    /// token is stored. A store that cannot be read counts as no token.
    pub fn restore(&self) -> bool {
        let stored = match self.store().contains(ACCESS_TOKEN) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "could not read stored credentials");
                false
            },
        };

        if stored {
            info!("restoring session from stored credentials");
            self.advance();
            self.state.send_replace(SessionState::authenticated(None));
        }
        stored
    }

    /// [`Self::restore`], then validate the session in the background.
    ///
    /// Returns the validation task, or `None` if there was nothing to
    /// restore or no Tokio runtime is running.
    pub fn start(&self) -> Option<JoinHandle<Option<User>>> {
        if !self.restore() {
            return None;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime, restored session left unvalidated");
            return None;
        };

        let manager = self.clone();
        Some(runtime.spawn(async move { manager.refresh_current_user().await }))
    }

    /// Log in with email and password.
    ///
    /// On success both tokens are stored and the returned user is published.
    ///
    /// # Errors
    ///
    /// - `Request` if the call fails (the state reverts)
    /// - `Rejected` if the server reports `success: false`
    /// - `Credential` if the tokens cannot be stored; nothing is left behind
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let spec = RequestSpec::post(services::AUTH, "/auth/login")
            .json(&LoginRequest::new(email, password))?
            .public();
        self.authenticate(spec).await
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::login`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, SessionError> {
        let spec = RequestSpec::post(services::AUTH, "/auth/register").json(request)?.public();
        self.authenticate(spec).await
    }

    /// End the session.
    ///
    /// Deletes both tokens and clears the state whatever the server says.
    /// If a token was stored, `POST /auth/logout` is sent on a background
    /// task with that token; its handle is returned so callers may await the
    /// notification, but nothing depends on it. Logging out while logged out
    /// changes nothing and sends nothing.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let notification = match self
            .dispatcher
            .prepare(RequestSpec::post(services::AUTH, "/auth/logout"))
        {
            Ok(prepared) => self.notify_logout(prepared),
            Err(RequestError::Unauthorized { .. }) => {
                debug!("no access token stored, skipping logout notification");
                None
            },
            Err(e) => {
                warn!(error = %e, "could not prepare logout notification");
                None
            },
        };

        if self.clear() {
            info!("logged out");
        }
        notification
    }

    /// Fetch `GET /auth/me` and publish the result.
    ///
    /// Any failure (transport, status, shape, `success: false`, no user)
    /// ends the session locally and yields `None`; it is never surfaced as
    /// an error. If the session was logged out or replaced while the request
    /// was in flight, the reply is discarded either way and `None` returned.
    pub async fn refresh_current_user(&self) -> Option<User> {
        let epoch = self.epoch();
        let user = match self.fetch_current_user().await {
            Ok(user) => user,
            Err(e) => {
                if self.end_session(epoch) {
                    info!(error = %e, "session validation failed, logging out");
                } else {
                    debug!(error = %e, "session changed during validation, ignoring failure");
                }
                return None;
            },
        };

        if !self.publish_user(epoch, &user) {
            debug!("session changed during validation, discarding user");
            return None;
        }
        Some(user)
    }

    /// Apply a partial profile update and publish the returned user.
    ///
    /// # Errors
    ///
    /// - `Request` if the call fails; an authorization failure also ends the
    ///   session
    /// - `Rejected` if the server reports `success: false`
    /// - `MissingUser` if the response has no user
    ///
    /// A reply that arrives after the session was logged out or replaced is
    /// returned to the caller but not published.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, SessionError> {
        let spec = RequestSpec::put(services::AUTH, "/auth/profile").json(update)?;

        let epoch = self.epoch();
        self.state.send_modify(|state| state.is_loading = true);
        let result = self.exchange_user(spec).await;

        let user = match result {
            Ok(user) => user,
            Err(e) => {
                self.settle(epoch);
                if let SessionError::Request(error) = &e {
                    self.observe_error_at(epoch, error);
                }
                return Err(e);
            },
        };

        if self.publish_user(epoch, &user) {
            info!(user_id = %user.id, "profile updated");
        } else {
            self.settle(epoch);
            debug!(user_id = %user.id, "session changed during profile update, not publishing");
        }
        Ok(user)
    }

    /// Ask the server to email a password reset link.
    ///
    /// Returns the server's message. Session state is not touched.
    ///
    /// # Errors
    ///
    /// - `Request` if the call fails
    /// - `Rejected` if the server reports `success: false`
    pub async fn forgot_password(&self, email: &str) -> Result<String, SessionError> {
        let spec = RequestSpec::post(services::AUTH, "/auth/forgot-password")
            .json(&ForgotPasswordRequest { email: email.to_string() })?
            .public();

        let envelope: Envelope = self.dispatcher.execute(spec).await?;
        if !envelope.success {
            return Err(rejected(envelope.message));
        }
        Ok(envelope.message.unwrap_or_default())
    }

    /// Trade the stored refresh token for a new access token.
    ///
    /// Only runs when called: no request is ever retried or refreshed
    /// automatically. A refused refresh token ends the session.
    ///
    /// # Errors
    ///
    /// - `Request(Unauthorized)` if no refresh token is stored or the server
    ///   refuses it
    /// - `Rejected` if the server reports `success: false`
    /// - `Credential` if the store cannot be read or written
    pub async fn refresh_access_token(&self) -> Result<(), SessionError> {
        let Some(refresh_token) = self.store().get(REFRESH_TOKEN)? else {
            return Err(RequestError::Unauthorized { status: None }.into());
        };

        let spec = RequestSpec::post(services::AUTH, "/auth/refresh-token")
            .json(&RefreshTokenRequest { refresh_token: refresh_token.expose().to_string() })?
            .public();

        let epoch = self.epoch();
        let response: TokenRefreshResponse = match self.dispatcher.execute(spec).await {
            Ok(response) => response,
            Err(e) => {
                self.observe_error_at(epoch, &e);
                return Err(e.into());
            },
        };
        if !response.success {
            return Err(rejected(None));
        }

        self.store().set(ACCESS_TOKEN, &response.token)?;
        debug!("access token refreshed");
        Ok(())
    }

    /// Report a request error seen outside the manager.
    ///
    /// Authorization failures end the session. Returns whether it did.
    pub fn observe_error(&self, error: &RequestError) -> bool {
        if !error.is_unauthorized() {
            return false;
        }
        info!(status = ?error.status(), "authorization failure, ending session");
        self.clear();
        true
    }

    /// [`Self::observe_error`] for a request issued during `epoch`.
    fn observe_error_at(&self, epoch: u64, error: &RequestError) {
        if !error.is_unauthorized() {
            return;
        }
        if self.end_session(epoch) {
            info!(status = ?error.status(), "authorization failure, ending session");
        } else {
            debug!(status = ?error.status(), "authorization failure for a replaced session");
        }
    }

    fn store(&self) -> &S {
        self.dispatcher.store()
    }

    async fn authenticate(&self, spec: RequestSpec) -> Result<User, SessionError> {
        self.advance();
        let previous = self.state.send_replace(self.snapshot().authenticating());

        match self.establish(spec).await {
            Ok(user) => {
                info!(user_id = %user.id, "session established");
                self.advance();
                self.state.send_replace(SessionState::authenticated(Some(user.clone())));
                Ok(user)
            },
            Err(e @ SessionError::Credential(_)) => {
                // Tokens were wiped, so there is no session left to return to.
                self.state.send_replace(SessionState::default());
                Err(e)
            },
            Err(e) => {
                debug!(error = %e, "authentication failed");
                self.state.send_replace(previous.settled());
                Err(e)
            },
        }
    }

    async fn establish(&self, spec: RequestSpec) -> Result<User, SessionError> {
        let envelope: Envelope = self.dispatcher.execute(spec).await?;
        if !envelope.success {
            return Err(rejected(envelope.message));
        }

        let (Some(token), Some(refresh_token)) = (&envelope.token, &envelope.refresh_token) else {
            return Err(SessionError::MissingCredentials);
        };
        let user = envelope.user.clone().ok_or(SessionError::MissingUser)?;

        self.persist(token, refresh_token)?;
        Ok(user)
    }

    /// Store both tokens, or neither.
    fn persist(&self, token: &str, refresh_token: &str) -> Result<(), SessionError> {
        let stored = self
            .store()
            .set(ACCESS_TOKEN, token)
            .and_then(|()| self.store().set(REFRESH_TOKEN, refresh_token));

        if let Err(e) = stored {
            warn!(error = %e, "could not store credentials");
            self.delete_tokens();
            return Err(e.into());
        }
        Ok(())
    }

    async fn fetch_current_user(&self) -> Result<User, SessionError> {
        self.exchange_user(RequestSpec::get(services::AUTH, "/auth/me")).await
    }

    /// Send `spec`, expecting an envelope with a user.
    ///
    /// Failures are returned untouched; ending the session is up to the
    /// caller, which knows the epoch the request belongs to.
    async fn exchange_user(&self, spec: RequestSpec) -> Result<User, SessionError> {
        let envelope: Envelope = self.dispatcher.execute(spec).await?;
        if !envelope.success {
            return Err(rejected(envelope.message));
        }
        envelope.user.ok_or(SessionError::MissingUser)
    }

    fn notify_logout(&self, prepared: PreparedRequest) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            debug!("no async runtime, skipping logout notification");
            return None;
        };

        let dispatcher = self.dispatcher.clone();
        Some(runtime.spawn(async move {
            if let Err(e) = dispatcher.send_raw(prepared).await {
                warn!(error = %e, "logout notification failed");
            }
        }))
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn advance(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Publish `user` if the session is still the authenticated one of `epoch`.
    ///
    /// The check runs under the state lock, so it cannot interleave with a
    /// publish from a newer session.
    fn publish_user(&self, epoch: u64, user: &User) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch() != epoch || !state.is_authenticated() {
                return false;
            }
            state.current_user = Some(user.clone());
            state.is_loading = false;
            true
        })
    }

    /// Drop the loading flag raised during `epoch`, unless the session moved on.
    fn settle(&self, epoch: u64) {
        self.state.send_if_modified(|state| {
            if self.epoch() != epoch || !state.is_loading {
                return false;
            }
            state.is_loading = false;
            true
        });
    }

    /// [`Self::clear`], but only if the session is still the one of `epoch`.
    fn end_session(&self, epoch: u64) -> bool {
        let next = epoch.wrapping_add(1);
        if self.epoch.compare_exchange(epoch, next, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return false;
        }
        self.reset();
        true
    }

    /// Delete both tokens and publish the logged out state.
    ///
    /// Returns whether the published state changed.
    fn clear(&self) -> bool {
        self.advance();
        self.reset()
    }

    fn reset(&self) -> bool {
        self.delete_tokens();
        self.state.send_if_modified(|state| {
            if *state == SessionState::default() {
                return false;
            }
            *state = SessionState::default();
            true
        })
    }

    fn delete_tokens(&self) {
        for name in [ACCESS_TOKEN, REFRESH_TOKEN] {
            if let Err(e) = self.store().delete(name) {
                warn!(credential = name, error = %e, "could not remove credential");
            }
        }
    }
}

fn rejected(message: Option<String>) -> SessionError {
    SessionError::Rejected { message: message.unwrap_or_else(|| "request declined".to_string()) }
}
