//! Response envelopes.
//!
//! The backend wraps most responses in a loose envelope carrying a `success`
//! flag and optional `message`, `data`, `user` and token fields. Auth
//! endpoints use the stricter [`AuthResponse`], where every field is present.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::User;

/// Generic response wrapper.
///
/// All payload fields are optional; which ones are populated depends on the
/// endpoint (`/auth/me` fills `user`, `/auth/forgot-password` only
/// `message`).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the backend considers the call successful.
    pub success: bool,
    /// Human readable outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Endpoint specific payload.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Account affected by the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Access token, when the endpoint mints one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Refresh token, when the endpoint mints one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Envelope whose `data` field is not interpreted.
pub type Envelope = ApiResponse<serde_json::Value>;

impl<T> ApiResponse<T> {
    /// Successful envelope with only `user` set.
    pub fn with_user(user: User) -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            user: Some(user),
            token: None,
            refresh_token: None,
        }
    }

    /// Envelope with only `success` and `message` set.
    pub fn with_message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: Some(message.into()),
            data: None,
            user: None,
            token: None,
            refresh_token: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ApiResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("success", &self.success)
            .field("message", &self.message)
            .field("data", &self.data)
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Response of `POST /auth/login` and `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Whether the backend accepted the credentials.
    pub success: bool,
    /// Human readable outcome.
    pub message: String,
    /// The authenticated account.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Long-lived token used to mint new access tokens.
    pub refresh_token: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("success", &self.success)
            .field("message", &self.message)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Response of `POST /auth/refresh-token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRefreshResponse {
    /// Whether a new token was minted.
    pub success: bool,
    /// The new access token.
    pub token: String,
}

impl fmt::Debug for TokenRefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRefreshResponse")
            .field("success", &self.success)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Body the backend sends alongside non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false` in practice.
    pub success: bool,
    /// Human readable reason.
    pub message: String,
    /// Machine readable error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
