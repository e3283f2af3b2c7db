//! # Taskboard Client Library
//!
//! Everything the Taskboard front end needs, independent of how it is
//! rendered: a typed API client, the session and route guard, dashboard
//! filtering, and task form state.
//!
//! ## Modules
//!
//! - `api`: `reqwest` wrapper for every endpoint
//! - `session`: Token persistence and the expiry-checked session context
//! - `routes`: Client routes and the login guard
//! - `dashboard`: Task filter and the created / assigned / overdue views
//! - `form`: Task and signup form validation
//!
//! ## Example
//!
//! ```no_run
//! use taskboard_client::{
//!     api::ApiClient,
//!     dashboard::DashboardState,
//!     session::{FileSessionStore, SessionContext},
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = SessionContext::restore(FileSessionStore::new("session.json"));
//! let mut client = ApiClient::new("http://localhost:5000/api", session)?;
//!
//! if let Some(user_id) = client.session().user_id() {
//!     let mut dashboard = DashboardState::new(user_id);
//!     dashboard.set_tasks(client.list_tasks().await?);
//!     println!("{} overdue", dashboard.views().overdue.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod dashboard;
pub mod form;
pub mod routes;
pub mod session;
