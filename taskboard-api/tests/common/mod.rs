/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store, so these tests need no
/// database. Helpers register users through the real endpoints and send
/// requests with `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::store::MemoryStore;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "correct horse battery";

/// A registered user and their token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Test context holding the router and its backing store
pub struct TestApp {
    pub app: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), Config::for_testing(TEST_SECRET));

        Self {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request and returns status plus parsed JSON body (`Null` if empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, body)
    }

    /// Registers a user and logs them in
    pub async fn register(&self, name: &str, email: &str) -> TestUser {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let id = body["_id"].as_str().unwrap().to_string();
        let token = self.login(email, PASSWORD).await;

        TestUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            token,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a task as `creator`, assigned to `assignee`
    pub async fn create_task(&self, creator: &TestUser, assignee: &TestUser, title: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/tasks",
                Some(&creator.token),
                Some(json!({ "title": title, "assignedTo": assignee.id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);

        body
    }

    pub async fn list_tasks(&self, user: &TestUser) -> Vec<Value> {
        let (status, body) = self.send(Method::GET, "/api/tasks", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::OK);

        body.as_array().cloned().unwrap_or_default()
    }
}
