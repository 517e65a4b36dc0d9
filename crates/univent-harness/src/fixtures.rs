//! Wire-format fixtures and wiring helpers.
//!
//! Bodies are built as `serde_json::Value` so tests can tweak a field before
//! scripting the response.

use serde_json::{Value, json};
use univent_client::{Dispatcher, ServiceRouter};
use univent_proto::{User, UserRole};
use univent_store::{CredentialStore, MemoryCredentialStore};

use crate::ScriptedTransport;

/// Dispatcher over the default routing table, an in-memory store and a
/// fresh spy.
pub fn dispatcher() -> (Dispatcher<MemoryCredentialStore, ScriptedTransport>, ScriptedTransport) {
    dispatcher_with_store(MemoryCredentialStore::new())
}

/// Dispatcher over the default routing table and `store`, plus its spy.
pub fn dispatcher_with_store<S: CredentialStore>(
    store: S,
) -> (Dispatcher<S, ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    (Dispatcher::new(ServiceRouter::default(), store, transport.clone()), transport)
}

/// Account JSON.
pub fn user_json(id: &str, first_name: &str, last_name: &str, role: UserRole) -> Value {
    json!({
        "id": id,
        "firstName": first_name,
        "lastName": last_name,
        "email": format!("{}@b.com", first_name.to_lowercase()),
        "college": "X",
        "role": role.as_str(),
    })
}

/// The participant `u1` ("A B", `a@b.com`).
pub fn participant_json() -> Value {
    user_json("u1", "A", "B", UserRole::Participant)
}

/// An admin account `u9`.
pub fn admin_json() -> Value {
    user_json("u9", "Root", "Admin", UserRole::Admin)
}

/// Decode a fixture into a [`User`].
///
/// # Panics
///
/// Panics if `value` is not a valid user; fixtures are test-only input.
#[allow(clippy::expect_used, reason = "fixture input is static test data")]
pub fn user(value: &Value) -> User {
    serde_json::from_value(value.clone()).expect("fixture is a valid user")
}

/// Successful `POST /auth/login` or `/auth/register` body.
pub fn auth_response(user: &Value, token: &str, refresh_token: &str) -> Value {
    json!({
        "success": true,
        "message": "ok",
        "user": user,
        "token": token,
        "refreshToken": refresh_token,
    })
}

/// Login of participant `u1` minting `t1` / `r1`.
pub fn login_ok() -> Value {
    auth_response(&participant_json(), "t1", "r1")
}

/// `GET /auth/me` or `PUT /auth/profile` body carrying `user`.
pub fn user_envelope(user: &Value) -> Value {
    json!({ "success": true, "user": user })
}

/// Envelope with only a message.
pub fn message_envelope(success: bool, message: &str) -> Value {
    json!({ "success": success, "message": message })
}

/// Body sent with non-2xx statuses.
pub fn error_body(message: &str) -> Value {
    json!({ "success": false, "message": message, "error": "ERROR" })
}

/// Envelope whose `data` is `data`.
pub fn data_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// Event JSON taking place at `date` (RFC 3339).
pub fn event_json(id: &str, title: &str, date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "date": date,
        "location": "Main Hall",
        "capacity": 100,
        "tags": ["tech"],
        "organizerName": "CS Club",
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
    })
}

/// Published announcement JSON created at `created_at` (RFC 3339).
pub fn announcement_json(id: &str, title: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": format!("{title} content"),
        "priority": "medium",
        "isPublished": true,
        "createdAt": created_at,
        "updatedAt": created_at,
    })
}

/// Overall leaderboard row.
pub fn leaderboard_row(user_id: &str, total_score: i64, rank: u32) -> Value {
    json!({
        "userId": user_id,
        "userName": format!("User {user_id}"),
        "totalScore": total_score,
        "eventCount": 3,
        "rank": rank,
    })
}
