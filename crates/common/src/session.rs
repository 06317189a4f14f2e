//! Session context.
//!
//! Every privileged call reads the current session from a [`SessionProvider`]
//! right before it is issued, so a sign-out between two calls is observed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::{AppError, AppResult};

/// Bearer token plus the authenticated flag the dashboard persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: String,
    /// Whether the user completed sign-in.
    #[serde(default)]
    pub authenticated: bool,
}

impl Session {
    /// Create an authenticated session for `token`.
    #[must_use]
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            authenticated: true,
        }
    }

    /// A session is usable only with both a token and the authenticated flag.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.authenticated && !self.token.trim().is_empty()
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Source of the current session.
pub trait SessionProvider: Send + Sync {
    /// Return the current session, or `None` when nobody is signed in.
    fn current(&self) -> AppResult<Option<Session>>;

    /// Return the current session only when it is usable.
    fn usable(&self) -> AppResult<Option<Session>> {
        Ok(self.current()?.filter(Session::is_usable))
    }
}

/// Explicit in-memory session context.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    inner: Arc<RwLock<Option<Session>>>,
}

impl StaticSession {
    /// Create a provider holding `session`.
    #[must_use]
    pub fn new(session: Option<Session>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Replace the held session, e.g. after sign-in or sign-out.
    pub fn set(&self, session: Option<Session>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

impl SessionProvider for StaticSession {
    fn current(&self) -> AppResult<Option<Session>> {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::Session("session lock poisoned".to_string()))
    }
}

/// Session persisted as JSON on disk, re-read on every call.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `session`, creating parent directories as needed.
    pub fn save(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Session(format!("{}: {e}", parent.display())))?;
        }
        let body = serde_json::to_vec_pretty(session)
            .map_err(|e| AppError::Internal(format!("Failed to serialize session: {e}")))?;
        std::fs::write(&self.path, body)
            .map_err(|e| AppError::Session(format!("{}: {e}", self.path.display())))
    }

    /// Remove the session file. A missing file is not an error.
    pub fn clear(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Session(format!("{}: {e}", self.path.display()))),
        }
    }
}

impl SessionProvider for FileSessionStore {
    fn current(&self) -> AppResult<Option<Session>> {
        let body = match std::fs::read(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Session(format!("{}: {e}", self.path.display()))),
        };

        match serde_json::from_slice::<Session>(&body) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("alertboard-session-{}-{name}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_session_usable() {
        assert!(Session::authenticated("tok").is_usable());
        assert!(!Session::authenticated("  ").is_usable());
        assert!(
            !Session {
                token: "tok".to_string(),
                authenticated: false,
            }
            .is_usable()
        );
        assert_eq!(Session::authenticated("tok").bearer(), "Bearer tok");
    }

    #[test]
    fn test_static_session_set() {
        let provider = StaticSession::new(None);
        assert!(provider.usable().unwrap().is_none());

        provider.set(Some(Session::authenticated("abc")));
        assert_eq!(provider.usable().unwrap().unwrap().token, "abc");

        provider.set(Some(Session {
            token: "abc".to_string(),
            authenticated: false,
        }));
        assert!(provider.current().unwrap().is_some());
        assert!(provider.usable().unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let store = FileSessionStore::new(temp_path("roundtrip"));
        assert!(store.current().unwrap().is_none());

        store.save(&Session::authenticated("persisted")).unwrap();
        assert_eq!(
            store.usable().unwrap(),
            Some(Session::authenticated("persisted"))
        );

        store.clear().unwrap();
        assert!(store.current().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_garbage_is_signed_out() {
        let path = temp_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.current().unwrap().is_none());
        store.clear().unwrap();
    }
}
