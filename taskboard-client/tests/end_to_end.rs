/// Client against a live server
///
/// Serves the real router (over the in-memory store) on an ephemeral port
/// and drives it through `ApiClient`, the dashboard and the task form.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use reqwest::StatusCode;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_client::{
    api::{ApiClient, ClientError, TaskPayload},
    dashboard::{DashboardState, TaskFilter},
    form::TaskForm,
    routes::{Navigation, Route},
    session::{
        FileSessionStore, MemorySessionStore, RestoreOutcome, SessionContext, SessionStore,
        StoredCredentials,
    },
};
use taskboard_shared::{
    models::task::{TaskPriority, TaskStatus},
    store::MemoryStore,
};
use uuid::Uuid;

const SECRET: &str = "end-to-end-test-secret-at-least-32-bytes";
const PASSWORD: &str = "correct horse battery";

async fn spawn_server() -> String {
    let state = AppState::new(Arc::new(MemoryStore::new()), Config::for_testing(SECRET));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, SessionContext::restore(MemorySessionStore::default())).unwrap()
}

/// Registers and logs in; returns the client and the user's id
async fn signed_in(base_url: &str, name: &str, email: &str) -> (ApiClient, Uuid) {
    let mut client = client(base_url);
    let profile = client.register(name, email, PASSWORD).await.unwrap();
    let session = client.login(email, PASSWORD).await.unwrap();
    assert_eq!(session.user_id, profile.id);

    (client, profile.id)
}

#[tokio::test]
async fn test_dashboard_flow() {
    let base_url = spawn_server().await;
    let (mut ada, ada_id) = signed_in(&base_url, "Ada", "ada@example.com").await;
    let (mut bob, bob_id) = signed_in(&base_url, "Bob", "bob@example.com").await;

    let users = ada.list_users().await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Bob"]);

    let mut form = TaskForm::new();
    form.title = "Write report".to_string();
    form.assigned_to = Some(bob_id);
    form.due_date = Some((Utc::now() - Duration::days(1)).date_naive());
    let saved = ada.create_task(&form.payload().unwrap()).await.unwrap();
    assert_eq!(form.notification(&saved, ada_id), "Task \"Write report\" assigned to Bob");

    let mut own = TaskForm::new();
    own.title = "Plan sprint".to_string();
    own.priority = TaskPriority::High;
    own.assigned_to = Some(ada_id);
    let planned = ada.create_task(&own.payload().unwrap()).await.unwrap();
    assert_eq!(
        own.notification(&planned, ada_id),
        "Task \"Plan sprint\" assigned to Ada (You)"
    );

    let mut dashboard = DashboardState::new(bob_id);
    dashboard.set_tasks(bob.list_tasks().await.unwrap());
    assert_eq!(dashboard.tasks().len(), 1);
    assert_eq!(dashboard.views().assigned_to_me.len(), 1);
    assert!(dashboard.views().created_by_me.is_empty());
    assert_eq!(dashboard.views().overdue.len(), 1);
    assert_eq!(
        dashboard.newest_assigned().map(|t| t.title.as_str()),
        Some("Write report")
    );

    // Completing the task takes it out of the overdue view
    let mut edit = TaskForm::edit(&bob.get_task(saved.id).await.unwrap());
    edit.status = TaskStatus::Completed;
    let updated = bob.update_task(saved.id, &edit.payload().unwrap()).await.unwrap();
    assert_eq!(edit.notification(&updated, bob_id), "Task \"Write report\" updated");

    dashboard.set_tasks(bob.list_tasks().await.unwrap());
    assert!(dashboard.views().overdue.is_empty());

    let mut ada_dashboard = DashboardState::new(ada_id);
    ada_dashboard.set_tasks(ada.list_tasks().await.unwrap());
    ada_dashboard.set_filter(TaskFilter {
        priority: Some(TaskPriority::High),
        ..Default::default()
    });
    assert_eq!(ada_dashboard.filtered().len(), 1);
    assert_eq!(ada_dashboard.views().created_by_me.len(), 1);
}

#[tokio::test]
async fn test_server_messages_surface() {
    let base_url = spawn_server().await;
    let (mut ada, ada_id) = signed_in(&base_url, "Ada", "ada@example.com").await;
    let (mut bob, bob_id) = signed_in(&base_url, "Bob", "bob@example.com").await;

    let err = client(&base_url)
        .register("Ada Again", "ada@example.com", PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(err.to_string(), "User already exists");

    let err = client(&base_url)
        .login("ada@example.com", "wrong password")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");

    let err = ada
        .create_task(&TaskPayload {
            title: Some("Orphan".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.to_string(), "Title and assignee are required");

    let task = ada
        .create_task(&TaskPayload {
            title: Some("Write report".to_string()),
            assigned_to: Some(bob_id),
            due_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(task.created_by.id, ada_id);
    assert_eq!(task.priority, TaskPriority::Medium);

    let err = bob.delete_task(task.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.to_string(), "Not authorized to delete this task");

    assert_eq!(ada.delete_task(task.id).await.unwrap(), "Task deleted");

    let err = ada.get_task(task.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), "Task not found");

    // Sessions survive server errors other than 401
    assert!(ada.session().is_authenticated());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let base_url = spawn_server().await;
    let (mut ada, ada_id) = signed_in(&base_url, "Ada", "ada@example.com").await;

    // A well-formed, unexpired token signed with the wrong secret
    let forged = taskboard_shared::auth::jwt::create_token(
        &taskboard_shared::auth::jwt::Claims::new(ada_id, Duration::hours(1)),
        "not-the-server-secret-but-32-bytes-long",
    )
    .unwrap();
    ada.session_mut().login(forged).unwrap();

    let err = ada.list_tasks().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.to_string(), "Token is not valid");

    assert!(!ada.session().is_authenticated());
    assert_eq!(
        Route::Dashboard.guard(ada.session().is_authenticated()),
        Navigation::Redirect(Route::Login)
    );
    assert!(matches!(
        ada.list_tasks().await.unwrap_err(),
        ClientError::NotLoggedIn
    ));
}

#[tokio::test]
async fn test_session_file_round_trip() {
    let base_url = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let profile = client(&base_url)
        .register("Ada", "ada@example.com", PASSWORD)
        .await
        .unwrap();

    let mut first = ApiClient::new(
        base_url.as_str(),
        SessionContext::restore(FileSessionStore::new(&path)),
    )
    .unwrap();
    first.login("ada@example.com", PASSWORD).await.unwrap();

    let mut second = ApiClient::new(
        base_url.as_str(),
        SessionContext::restore(FileSessionStore::new(&path)),
    )
    .unwrap();
    assert_eq!(second.session().outcome(), RestoreOutcome::Authenticated);
    assert_eq!(second.session().user_id(), Some(profile.id));
    assert!(second.list_tasks().await.unwrap().is_empty());

    second.logout().unwrap();
    assert!(FileSessionStore::new(&path).load().unwrap().is_none());

    let third = SessionContext::restore(FileSessionStore::new(&path));
    assert_eq!(third.outcome(), RestoreOutcome::NoToken);
}

#[tokio::test]
async fn test_expired_stored_token_redirects() {
    let user_id = Uuid::new_v4();
    let expired = taskboard_shared::auth::jwt::create_token(
        &taskboard_shared::auth::jwt::Claims::new(user_id, Duration::seconds(-5)),
        SECRET,
    )
    .unwrap();

    let store = MemorySessionStore::with_credentials(StoredCredentials {
        token: expired,
        expiry: Utc::now() - Duration::seconds(5),
    });
    let ctx = SessionContext::restore(store);

    assert_eq!(ctx.outcome(), RestoreOutcome::Expired);
    assert_eq!(
        Route::CreateTask.guard(ctx.is_authenticated()),
        Navigation::Redirect(Route::Login)
    );
}
