/// Typed HTTP client for the Taskboard API
///
/// Wraps `reqwest` with one method per endpoint. Authenticated calls take
/// the token from the [`SessionContext`]; a session found expired, or a 401
/// on any of them, drops the session so the caller ends up back at the
/// login route.
///
/// Failed calls surface the server's `message` when there is one, and a
/// per-operation default otherwise.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::{api::ApiClient, session::{MemorySessionStore, SessionContext}};
///
/// # async fn example() -> Result<(), taskboard_client::api::ClientError> {
/// let session = SessionContext::restore(MemorySessionStore::default());
/// let mut client = ApiClient::new("http://localhost:5000/api", session)?;
///
/// client.login("ada@example.com", "correct horse").await?;
/// let tasks = client.list_tasks().await?;
/// println!("{} tasks", tasks.len());
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use taskboard_shared::models::{
    task::{TaskDetails, TaskPriority, TaskStatus},
    user::{UserProfile, UserSummary},
};
use uuid::Uuid;

use crate::session::{Session, SessionContext, SessionError};

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for API calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server answered with a non-success status
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// No unexpired session for an authenticated call
    #[error("Please log in")]
    NotLoggedIn,

    /// Server unreachable or response unreadable
    #[error("Something went wrong! Please try again later")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Body for creating or updating a task
///
/// `None` fields are left out, which the API reads as "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Creates a client for the API rooted at `base_url` (e.g. `http://host:5000/api`)
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Registers an account; the caller still has to log in
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let request = self
            .http
            .post(self.url("/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": password }));

        read_response(request.send().await?, "Registration failed").await
    }

    /// Logs in and stores the issued token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ClientError> {
        let request = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));

        let body: TokenBody = read_response(request.send().await?, "Login Failed").await?;
        let session = self.session.login(body.token)?;

        tracing::info!(user_id = %session.user_id, "Logged in");
        Ok(session)
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session.logout()?;
        Ok(())
    }

    pub async fn list_users(&mut self) -> Result<Vec<UserSummary>, ClientError> {
        self.authorized(Method::GET, "/auth/users", None::<&()>, "Failed to fetch users")
            .await
    }

    pub async fn list_tasks(&mut self) -> Result<Vec<TaskDetails>, ClientError> {
        self.authorized(Method::GET, "/tasks", None::<&()>, "Failed to fetch tasks")
            .await
    }

    pub async fn get_task(&mut self, id: Uuid) -> Result<TaskDetails, ClientError> {
        self.authorized(
            Method::GET,
            &format!("/tasks/{}", id),
            None::<&()>,
            "Failed to fetch task",
        )
        .await
    }

    pub async fn create_task(&mut self, payload: &TaskPayload) -> Result<TaskDetails, ClientError> {
        self.authorized(
            Method::POST,
            "/tasks",
            Some(payload),
            "Failed to save task. Check backend configuration.",
        )
        .await
    }

    pub async fn update_task(
        &mut self,
        id: Uuid,
        payload: &TaskPayload,
    ) -> Result<TaskDetails, ClientError> {
        self.authorized(
            Method::PUT,
            &format!("/tasks/{}", id),
            Some(payload),
            "Failed to save task. Check backend configuration.",
        )
        .await
    }

    /// Deletes a task and returns the server's confirmation message
    pub async fn delete_task(&mut self, id: Uuid) -> Result<String, ClientError> {
        let body: MessageBody = self
            .authorized(
                Method::DELETE,
                &format!("/tasks/{}", id),
                None::<&()>,
                "Failed to delete task",
            )
            .await?;

        Ok(body.message)
    }

    async fn authorized<B, T>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&B>,
        default_message: &str,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = match self.session.active() {
            Some(session) => session.token.clone(),
            None => return Err(ClientError::NotLoggedIn),
        };

        let mut request: RequestBuilder = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(path, "Session rejected by server");
            self.session.invalidate();
        }

        read_response(response, default_message).await
    }
}

async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
    default_message: &str,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_message.to_string());

    Err(ClientError::Api { status, message })
}
