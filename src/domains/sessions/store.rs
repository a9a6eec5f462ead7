//! Concurrent registry of in-progress sessions.
//!
//! The map itself is guarded by a read/write lock while every session sits
//! behind its own mutex, so calls on different session ids never contend
//! on session data and calls on the same id are serialized.
//!
//! Lock order is always session -> map. Code holding the map lock never
//! blocks on a session mutex (expiry uses `try_lock`, `list` releases the
//! map before locking sessions).

use chrono::{Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::schema::ParameterSchema;
use super::session::Session;

/// Shared, individually lockable session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Registry mapping session ids to sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    /// Create a store whose sessions live until they complete.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that drops sessions idle for longer than `timeout`.
    pub fn with_idle_timeout(timeout: std::time::Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::from_std(timeout).ok(),
        }
    }

    /// Generate a fresh random session id (UUID v4, hyphenated).
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Insert a new session under `id`, replacing any existing one.
    pub fn create(&self, id: &str, tool_name: &str, schema: &ParameterSchema) -> SessionHandle {
        let handle = Arc::new(Mutex::new(Session::new(tool_name, schema)));
        let mut sessions = self.sessions.write();
        self.purge_expired(&mut sessions);
        if sessions.insert(id.to_string(), handle.clone()).is_some() {
            debug!("Replaced existing session {}", id);
        }
        debug!("Created session {} for tool {}", id, tool_name);
        handle
    }

    /// Fetch the session registered under `id`, creating it if absent.
    ///
    /// Returns the handle and whether it was newly created. Lookup and
    /// insertion happen under one write lock, so concurrent first calls
    /// with the same id share a single session.
    pub fn get_or_create(
        &self,
        id: &str,
        tool_name: &str,
        schema: &ParameterSchema,
    ) -> (SessionHandle, bool) {
        let mut sessions = self.sessions.write();
        self.purge_expired(&mut sessions);

        if let Some(handle) = sessions.get(id) {
            return (handle.clone(), false);
        }

        let handle = Arc::new(Mutex::new(Session::new(tool_name, schema)));
        sessions.insert(id.to_string(), handle.clone());
        debug!("Created session {} for tool {}", id, tool_name);
        (handle, true)
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        if self.idle_timeout.is_some() {
            let mut sessions = self.sessions.write();
            self.purge_expired(&mut sessions);
            return sessions.get(id).cloned();
        }
        self.sessions.read().get(id).cloned()
    }

    /// Whether `handle` is still the session registered under `id`.
    pub fn is_current(&self, id: &str, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Remove a session. Removing an unknown id is a no-op.
    pub fn delete(&self, id: &str) {
        if self.sessions.write().remove(id).is_some() {
            debug!("Deleted session {}", id);
        }
    }

    /// Point-in-time copy of every session.
    pub fn list(&self) -> HashMap<String, Session> {
        let handles: Vec<(String, SessionHandle)> = {
            let mut sessions = self.sessions.write();
            self.purge_expired(&mut sessions);
            sessions
                .iter()
                .map(|(id, handle)| (id.clone(), handle.clone()))
                .collect()
        };

        handles
            .into_iter()
            .map(|(id, handle)| {
                let session = handle.lock().clone();
                (id, session)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Drop sessions idle past the timeout. Sessions currently locked by a
    /// caller are in use and are skipped.
    fn purge_expired(&self, sessions: &mut HashMap<String, SessionHandle>) {
        let Some(timeout) = self.idle_timeout else {
            return;
        };

        let cutoff = Utc::now() - timeout;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Some(session) => session.updated_at() >= cutoff,
            None => true,
        });

        let purged = before - sessions.len();
        if purged > 0 {
            info!("Expired {} idle session(s)", purged);
        }
    }
}
