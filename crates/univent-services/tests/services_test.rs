//! Domain services against the scripted network spy.

use chrono::{TimeZone, Utc};
use serde_json::json;
use univent_client::{Method, RequestError};
use univent_harness::{ScriptedTransport, fixtures};
use univent_proto::{
    UserRole,
    payloads::{
        AnnouncementPriority, AnnouncementQuery, AnnouncementUpdate, EventUpdate,
        NewAnnouncement, NewEvent, RegistrationDetails, ScoreSubmission,
    },
};
use univent_services::{
    AdminService, AnnouncementService, EventService, LeaderboardService, Listing, ServiceError,
};
use univent_session::SessionManager;
use univent_store::{ACCESS_TOKEN, CredentialStore, MemoryCredentialStore};

type Dispatcher = univent_client::Dispatcher<MemoryCredentialStore, ScriptedTransport>;

fn logged_in() -> (Dispatcher, ScriptedTransport) {
    let (dispatcher, transport) = fixtures::dispatcher();
    dispatcher.store().set(ACCESS_TOKEN, "t1").unwrap();
    (dispatcher, transport)
}

fn ids<T>(listing: &Listing<T>, id: impl Fn(&T) -> &str) -> Vec<String> {
    listing.items.iter().map(|item| id(item).to_string()).collect()
}

#[tokio::test]
async fn events_are_listed_earliest_first() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/events",
        200,
        &json!([
            fixtures::event_json("e2", "Hackathon", "2026-03-10T09:00:00Z"),
            fixtures::event_json("e1", "Orientation", "2026-02-01T09:00:00+05:30"),
            fixtures::event_json("e3", "Finals", "2026-05-20T18:00:00Z"),
        ]),
    );

    let fetched = events.fetch_events().await.unwrap();

    assert_eq!(fetched.len(), 3);
    assert_eq!(ids(&events.snapshot(), |e| e.id.as_str()), ["e1", "e2", "e3"]);
    assert!(!events.snapshot().is_loading);
    assert!(transport.last_request().unwrap().header("Authorization").is_none());
    assert_eq!(events.event("e2").map(|e| e.title).as_deref(), Some("Hackathon"));
    assert!(events.event("missing").is_none());
}

#[tokio::test]
async fn failed_fetch_keeps_listing_and_clears_loading() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/events",
        200,
        &json!([fixtures::event_json("e1", "A", "2026-02-01T09:00:00Z")]),
    );
    events.fetch_events().await.unwrap();

    transport.respond(Method::Get, "/events", 503, "");
    let err = events.fetch_events().await.unwrap_err();

    assert!(matches!(err, ServiceError::Request(RequestError::Rejected { status: 503, .. })));
    assert_eq!(events.snapshot().items.len(), 1);
    assert!(!events.snapshot().is_loading);
}

#[tokio::test]
async fn created_event_is_spliced_in_date_order() {
    let (dispatcher, transport) = logged_in();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/events",
        200,
        &json!([
            fixtures::event_json("e1", "A", "2026-02-01T09:00:00Z"),
            fixtures::event_json("e3", "C", "2026-04-01T09:00:00Z"),
        ]),
    );
    transport.respond_json(
        Method::Post,
        "/events",
        201,
        &fixtures::event_json("e2", "B", "2026-03-01T09:00:00Z"),
    );
    events.fetch_events().await.unwrap();

    let new_event = NewEvent {
        title: "B".into(),
        description: "B description".into(),
        date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        location: "Main Hall".into(),
        capacity: 100,
        tags: vec!["tech".into()],
        organizer_name: None,
        image: None,
    };
    let created = events.create_event(&new_event).await.unwrap();

    assert_eq!(created.id, "e2");
    assert_eq!(ids(&events.snapshot(), |e| e.id.as_str()), ["e1", "e2", "e3"]);

    let request = transport.last_request().unwrap();
    let body: serde_json::Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["date"], "2026-03-01T09:00:00Z");
    assert!(body.get("organizerName").is_none());
}

#[tokio::test]
async fn updated_event_replaces_listed_one() {
    let (dispatcher, transport) = logged_in();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/events",
        200,
        &json!([fixtures::event_json("e1", "Old", "2026-02-01T09:00:00Z")]),
    );
    transport.respond_json(
        Method::Put,
        "/events/e1",
        200,
        &fixtures::event_json("e1", "New", "2026-02-01T09:00:00Z"),
    );
    events.fetch_events().await.unwrap();

    events.update_event("e1", &EventUpdate::new().title("New")).await.unwrap();

    assert_eq!(events.event("e1").unwrap().title, "New");
    assert_eq!(
        transport.last_request().unwrap().body.as_deref(),
        Some(br#"{"title":"New"}"#.as_slice()),
    );
}

#[tokio::test]
async fn registration_without_details_sends_no_body() {
    let (dispatcher, transport) = logged_in();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Post,
        "/events/e1/register",
        200,
        &fixtures::message_envelope(true, "Registered"),
    );

    events.register_for_event("e1", &RegistrationDetails::default()).await.unwrap();
    assert!(transport.last_request().unwrap().body.is_none());

    let details =
        RegistrationDetails { name: Some("A B".into()), ..RegistrationDetails::default() };
    events.register_for_event("e1", &details).await.unwrap();
    assert_eq!(
        transport.last_request().unwrap().body.as_deref(),
        Some(br#"{"name":"A B"}"#.as_slice()),
    );
}

#[tokio::test]
async fn declined_registration_is_rejected() {
    let (dispatcher, transport) = logged_in();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Post,
        "/events/e1/register",
        200,
        &fixtures::message_envelope(false, "Event is full"),
    );

    let err = events.register_for_event("e1", &RegistrationDetails::default()).await.unwrap_err();

    assert_eq!(err, ServiceError::Rejected { message: "Event is full".to_string() });
}

#[tokio::test]
async fn registration_requires_a_token() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let events = EventService::new(dispatcher);

    let err = events.cancel_registration("e1").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn cancel_and_participants_use_encoded_paths() {
    let (dispatcher, transport) = logged_in();
    let events = EventService::new(dispatcher);
    transport.respond_json(
        Method::Delete,
        "/events/a%2Fb/register",
        200,
        &fixtures::message_envelope(true, "Cancelled"),
    );
    transport.respond_json(
        Method::Get,
        "/events/e1/participants",
        200,
        &json!([{ "id": "p1", "name": "A B", "registeredAt": "2026-01-05T10:00:00Z" }]),
    );

    events.cancel_registration("a/b").await.unwrap();
    let participants = events.participants("e1").await.unwrap();

    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].name, "A B");
    assert_eq!(transport.requests()[0].url, "http://localhost:8002/api/events/a%2Fb/register");
}

#[tokio::test]
async fn announcements_are_newest_first_and_filtered() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let announcements = AnnouncementService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/announcements?eventId=e1&priority=high&isPublished=true",
        200,
        &json!([
            fixtures::announcement_json("a1", "Old", "2026-01-01T08:00:00Z"),
            fixtures::announcement_json("a2", "New", "2026-01-02T08:00:00Z"),
        ]),
    );

    let query = AnnouncementQuery {
        event_id: Some("e1".into()),
        priority: Some(AnnouncementPriority::High),
    };
    announcements.fetch_announcements(&query).await.unwrap();

    assert_eq!(ids(&announcements.snapshot(), |a| a.id.as_str()), ["a2", "a1"]);
    assert!(transport.last_request().unwrap().header("Authorization").is_none());
}

#[tokio::test]
async fn unfiltered_fetch_still_requests_published_only() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let announcements = AnnouncementService::new(dispatcher);
    transport.respond_json(Method::Get, "/announcements?isPublished=true", 200, &json!([]));

    announcements.fetch_announcements(&AnnouncementQuery::default()).await.unwrap();

    assert_eq!(transport.request_count(), 1);
    assert!(transport.last_request().unwrap().url.ends_with("/announcements?isPublished=true"));
}

#[tokio::test]
async fn announcement_lifecycle_splices_listing() {
    let (dispatcher, transport) = logged_in();
    let announcements = AnnouncementService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/announcements?isPublished=true",
        200,
        &json!([fixtures::announcement_json("a1", "First", "2026-01-01T08:00:00Z")]),
    );
    announcements.fetch_announcements(&AnnouncementQuery::default()).await.unwrap();

    transport.respond_json(
        Method::Post,
        "/announcements",
        201,
        &fixtures::announcement_json("a2", "Second", "2026-01-02T08:00:00Z"),
    );
    let second = NewAnnouncement::new("Second", "Second content");
    announcements.create_announcement(&second).await.unwrap();
    assert_eq!(ids(&announcements.snapshot(), |a| a.id.as_str()), ["a2", "a1"]);

    let mut edited = fixtures::announcement_json("a1", "First (edited)", "2026-01-01T08:00:00Z");
    edited["priority"] = json!("high");
    transport.respond_json(Method::Put, "/announcements/a1", 200, &edited);
    let update =
        AnnouncementUpdate::new().title("First (edited)").priority(AnnouncementPriority::High);
    announcements.update_announcement("a1", &update).await.unwrap();
    assert_eq!(announcements.snapshot().items[1].title, "First (edited)");

    transport.respond_json(
        Method::Delete,
        "/announcements/a2",
        200,
        &fixtures::message_envelope(true, "Deleted"),
    );
    announcements.delete_announcement("a2").await.unwrap();
    assert_eq!(ids(&announcements.snapshot(), |a| a.id.as_str()), ["a1"]);
}

#[tokio::test]
async fn leaderboards_are_public_and_kept_apart() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let leaderboard = LeaderboardService::new(dispatcher);
    transport.respond_json(
        Method::Get,
        "/leaderboard/top?limit=2",
        200,
        &json!([fixtures::leaderboard_row("u1", 300, 1), fixtures::leaderboard_row("u2", 120, 2)]),
    );
    transport.respond_json(
        Method::Get,
        "/leaderboard/event/e1",
        200,
        &json!([{ "userId": "u3", "userName": "C", "score": 40, "rank": 4 }]),
    );

    let top = leaderboard.fetch_top_performers(2).await.unwrap();
    let event = leaderboard.fetch_event_leaderboard("e1").await.unwrap();

    assert_eq!(top[0].display_score(), 300);
    assert_eq!(top[0].rank_label(), "🥇");
    assert_eq!(event[0].display_score(), 40);
    assert_eq!(event[0].rank_label(), "#4");
    assert_eq!(leaderboard.top_performers().items.len(), 2);
    assert_eq!(leaderboard.event_leaderboard().items.len(), 1);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn submitted_score_returns_updated_row() {
    let (dispatcher, transport) = logged_in();
    let leaderboard = LeaderboardService::new(dispatcher);
    transport.respond_json(
        Method::Post,
        "/leaderboard/event/e1",
        200,
        &json!({ "success": true, "data": { "userId": "u1", "userName": "A B", "score": 55 } }),
    );

    let row = leaderboard
        .submit_score("e1", &ScoreSubmission { user_id: "u1".into(), score: 55 })
        .await
        .unwrap();

    assert_eq!(row.map(|r| r.display_score()), Some(55));
    let body: serde_json::Value =
        serde_json::from_slice(transport.last_request().unwrap().body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "userId": "u1", "score": 55 }));
}

async fn admin_session(
    role: UserRole,
) -> (AdminService<MemoryCredentialStore, ScriptedTransport>, ScriptedTransport) {
    let (dispatcher, transport) = fixtures::dispatcher();
    let session = SessionManager::new(dispatcher);
    let user = fixtures::user_json("u9", "Root", "Admin", role);
    transport.respond_json(
        Method::Post,
        "/auth/login",
        200,
        &fixtures::auth_response(&user, "t9", "r9"),
    );
    session.login("root@b.com", "pw").await.unwrap();
    (AdminService::new(session), transport)
}

#[tokio::test]
async fn non_admin_cannot_list_users() {
    let (admin, transport) = admin_session(UserRole::Organizer).await;
    let before = transport.request_count();

    let err = admin.fetch_all_users().await.unwrap_err();

    assert_eq!(err, ServiceError::NotPermitted { operation: "list users" });
    assert_eq!(transport.request_count(), before);
}

#[tokio::test]
async fn admin_lists_users_and_changes_roles() {
    let (admin, transport) = admin_session(UserRole::Admin).await;
    transport.respond_json(
        Method::Get,
        "/admin/users",
        200,
        &json!([fixtures::participant_json(), fixtures::admin_json()]),
    );
    transport.respond_json(
        Method::Put,
        "/admin/users/u1/role",
        200,
        &fixtures::user_json("u1", "A", "B", UserRole::Organizer),
    );

    let users = admin.fetch_all_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(transport.last_request().unwrap().url, "http://localhost:8001/api/admin/users");

    let updated = admin.update_user_role("u1", UserRole::Organizer).await.unwrap();
    assert!(updated.is_organizer());
    assert_eq!(admin.snapshot().items[0].role, UserRole::Organizer);
    assert_eq!(
        transport.last_request().unwrap().body.as_deref(),
        Some(br#"{"role":"organizer"}"#.as_slice()),
    );
}

#[tokio::test]
async fn unauthorized_admin_call_ends_session() {
    let (dispatcher, transport) = fixtures::dispatcher();
    let session = SessionManager::new(dispatcher);
    transport.respond_json(
        Method::Post,
        "/auth/login",
        200,
        &fixtures::auth_response(&fixtures::admin_json(), "t9", "r9"),
    );
    session.login("root@b.com", "pw").await.unwrap();
    transport.respond(Method::Get, "/admin/users/u1", 401, "");
    let admin = AdminService::new(session.clone());

    let err = admin.user_by_id("u1").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
    assert!(session.dispatcher().store().is_empty());
}
