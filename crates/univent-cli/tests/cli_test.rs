//! Command parsing and runs against a durable store.

use clap::Parser;
use serde_json::json;
use tempfile::tempdir;
use univent_cli::{CliError, Command, Services};
use univent_client::{Dispatcher, Method, ServiceRouter};
use univent_harness::{ScriptedTransport, fixtures};
use univent_proto::{UserRole, payloads::AnnouncementPriority};
use univent_services::ServiceError;
use univent_session::SessionManager;
use univent_store::{ACCESS_TOKEN, CredentialStore, RedbCredentialStore};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn parse(args: &[&str]) -> Command {
    Cli::try_parse_from(std::iter::once("univent").chain(args.iter().copied()))
        .unwrap()
        .command
}

fn services(
    store: RedbCredentialStore,
    transport: ScriptedTransport,
) -> Services<RedbCredentialStore, ScriptedTransport> {
    let session = SessionManager::new(Dispatcher::new(ServiceRouter::default(), store, transport));
    session.restore();
    Services::new(session)
}

#[test]
fn parses_announcement_filters() {
    assert_eq!(
        parse(&["announcements", "--event-id", "e1", "--priority", "high"]),
        Command::Announcements {
            event_id: Some("e1".to_string()),
            priority: Some(AnnouncementPriority::High),
        }
    );
}

#[test]
fn leaderboard_limit_defaults_to_ten() {
    assert_eq!(parse(&["leaderboard"]), Command::Leaderboard { event_id: None, limit: 10 });
}

#[test]
fn parses_role_change() {
    assert_eq!(
        parse(&["set-role", "u2", "organizer"]),
        Command::SetRole { user_id: "u2".to_string(), role: UserRole::Organizer }
    );
    assert!(Cli::try_parse_from(["univent", "set-role", "u2", "root"]).is_err());
}

#[tokio::test]
async fn login_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("creds.redb");

    {
        let transport = ScriptedTransport::new();
        transport.respond_json(Method::Post, "/auth/login", 200, &fixtures::login_ok());
        let services = services(RedbCredentialStore::open(&path).unwrap(), transport);

        services
            .run(Command::Login { email: "a@b.com".into(), password: "pw".into() })
            .await
            .unwrap();
    }

    let transport = ScriptedTransport::new();
    let user = fixtures::participant_json();
    transport.respond_json(Method::Get, "/auth/me", 200, &fixtures::user_envelope(&user));
    let services = services(RedbCredentialStore::open(&path).unwrap(), transport.clone());

    assert!(services.session().is_authenticated());
    let output = services.run(Command::Whoami).await.unwrap();

    assert_eq!(output, "A B <a@b.com> [participant] u1");
    let me = transport.last_request().unwrap();
    assert_eq!(me.header("authorization").as_deref(), Some("Bearer t1"));
}

#[tokio::test]
async fn participant_cannot_list_users() {
    let dir = tempdir().unwrap();
    let store = RedbCredentialStore::open(dir.path().join("creds.redb")).unwrap();
    store.set(ACCESS_TOKEN, "t1").unwrap();

    let transport = ScriptedTransport::new();
    let user = fixtures::participant_json();
    transport.respond_json(Method::Get, "/auth/me", 200, &fixtures::user_envelope(&user));
    transport.respond_json(Method::Get, "/admin/users", 200, &json!([]));
    let services = services(store, transport.clone());

    let result = services.run(Command::Users).await;

    assert!(matches!(result, Err(CliError::Service(ServiceError::NotPermitted { .. }))));
    assert!(transport.requests_to("/admin/users").is_empty());
}

#[tokio::test]
async fn admin_lists_users() {
    let dir = tempdir().unwrap();
    let store = RedbCredentialStore::open(dir.path().join("creds.redb")).unwrap();
    store.set(ACCESS_TOKEN, "t9").unwrap();

    let transport = ScriptedTransport::new();
    let admin = fixtures::admin_json();
    transport.respond_json(Method::Get, "/auth/me", 200, &fixtures::user_envelope(&admin));
    transport.respond_json(
        Method::Get,
        "/admin/users",
        200,
        &json!([admin, fixtures::participant_json()]),
    );
    let services = services(store, transport);

    let output = services.run(Command::Users).await.unwrap();

    assert_eq!(output.lines().count(), 2);
    assert!(output.contains("Root Admin"));
}
