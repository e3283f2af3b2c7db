/// Client-side session handling
///
/// The client keeps two values between runs: the bearer token and its
/// expiry. [`SessionContext`] restores them on startup, decodes the token
/// payload (without the signing secret) and hands out the session only
/// while it is unexpired.
///
/// # Example
///
/// ```
/// use taskboard_client::session::{MemorySessionStore, RestoreOutcome, SessionContext};
///
/// let ctx = SessionContext::restore(MemorySessionStore::default());
/// assert_eq!(ctx.outcome(), RestoreOutcome::NoToken);
/// assert!(ctx.current().is_none());
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use taskboard_shared::auth::jwt;
use uuid::Uuid;

/// Error type for session persistence
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token payload could not be decoded
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Session file could not be read or written
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Session file is not valid JSON
    #[error("Corrupt session file: {0}")]
    Format(#[from] serde_json::Error),

    /// Token was already past its expiry
    #[error("Session expired. Please log in again.")]
    Expired,
}

/// An authenticated session decoded from a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Decodes the token payload; the signature is not checked
    pub fn from_token(token: impl Into<String>) -> Result<Self, SessionError> {
        let token = token.into();
        let claims =
            jwt::decode_unverified(&token).map_err(|e| SessionError::InvalidToken(e.to_string()))?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| SessionError::InvalidToken("expiry out of range".to_string()))?;

        Ok(Self {
            token,
            user_id: claims.user_id,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// What is persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

/// Persistence for the token and its expiry
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredCredentials>, SessionError>;
    fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Stores credentials as a small JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredCredentials>, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(credentials)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps credentials in memory only; clones share one slot
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    credentials: Arc<Mutex<Option<StoredCredentials>>>,
}

impl MemorySessionStore {
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            credentials: Arc::new(Mutex::new(Some(credentials))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<StoredCredentials>> {
        self.credentials.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredCredentials>, SessionError> {
        Ok(self.slot().clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError> {
        *self.slot() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Result of restoring a stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Authenticated,
    NoToken,
    InvalidToken,
    Expired,
    LoggedOut,
}

impl RestoreOutcome {
    /// Message shown when the user has to log in again
    pub fn message(&self) -> Option<&'static str> {
        match self {
            RestoreOutcome::Authenticated | RestoreOutcome::LoggedOut => None,
            RestoreOutcome::NoToken => Some("Please log in to access the dashboard."),
            RestoreOutcome::InvalidToken => Some("Invalid token. Please log in again."),
            RestoreOutcome::Expired => Some("Session expired. Please log in again."),
        }
    }
}

/// The current session, passed explicitly to whatever needs it
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    session: Option<Session>,
    outcome: RestoreOutcome,
}

impl SessionContext {
    /// Restores the stored session, clearing it if unusable
    pub fn restore(store: impl SessionStore + 'static) -> Self {
        Self::restore_at(store, Utc::now())
    }

    pub fn restore_at(store: impl SessionStore + 'static, now: DateTime<Utc>) -> Self {
        let mut ctx = Self {
            store: Box::new(store),
            session: None,
            outcome: RestoreOutcome::NoToken,
        };

        let stored = match ctx.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return ctx,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session");
                ctx.discard(RestoreOutcome::InvalidToken);
                return ctx;
            }
        };

        match Session::from_token(stored.token) {
            Ok(session) if session.is_expired_at(now) || stored.expiry <= now => {
                ctx.discard(RestoreOutcome::Expired);
            }
            Ok(session) => {
                ctx.session = Some(session);
                ctx.outcome = RestoreOutcome::Authenticated;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable token");
                ctx.discard(RestoreOutcome::InvalidToken);
            }
        }

        ctx
    }

    fn discard(&mut self, outcome: RestoreOutcome) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear session store");
        }
        self.session = None;
        self.outcome = outcome;
    }

    /// How the last restore/login/logout left the context
    pub fn outcome(&self) -> RestoreOutcome {
        self.outcome
    }

    /// The session, if present and unexpired
    pub fn current(&self) -> Option<&Session> {
        self.current_at(Utc::now())
    }

    pub fn current_at(&self, now: DateTime<Utc>) -> Option<&Session> {
        self.session.as_ref().filter(|s| !s.is_expired_at(now))
    }

    /// The session if unexpired; an expired one is cleared from the store
    pub fn active(&mut self) -> Option<&Session> {
        self.active_at(Utc::now())
    }

    pub fn active_at(&mut self, now: DateTime<Utc>) -> Option<&Session> {
        if self.session.as_ref().is_some_and(|s| s.is_expired_at(now)) {
            tracing::debug!("Session expired while held");
            self.discard(RestoreOutcome::Expired);
        }
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.current().map(|s| s.user_id)
    }

    /// Stores a freshly issued token
    ///
    /// A token that is already expired is refused and any stored session
    /// is cleared.
    pub fn login(&mut self, token: impl Into<String>) -> Result<&Session, SessionError> {
        self.login_at(token, Utc::now())
    }

    pub fn login_at(
        &mut self,
        token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Session, SessionError> {
        let session = Session::from_token(token)?;
        if session.is_expired_at(now) {
            self.discard(RestoreOutcome::Expired);
            return Err(SessionError::Expired);
        }

        self.store.save(&StoredCredentials {
            token: session.token.clone(),
            expiry: session.expires_at,
        })?;

        self.outcome = RestoreOutcome::Authenticated;
        Ok(self.session.insert(session))
    }

    /// Clears both the token and the expiry
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.session = None;
        self.outcome = RestoreOutcome::LoggedOut;
        self.store.clear()
    }

    /// Drops a session the server rejected
    pub fn invalidate(&mut self) {
        self.discard(RestoreOutcome::Expired);
    }
}
