// ============================
// complaint-desk-backend/src/auth/session.rs
// ============================
//! Session token handling and management.
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use complaint_desk_common::{Flash, SessionUser};
use metrics::{counter, gauge};
use tokio::{sync::RwLock, task::JoinHandle};

use super::token_generator::generate_secure_token;
use crate::metrics as keys;

/// Default session TTL (time to live)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24); // 1 day

/// Session information
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    /// Signed-in identity; `None` for anonymous visitors
    pub user: Option<SessionUser>,
    /// Messages waiting to be shown on the next rendered page
    pub flashes: Vec<Flash>,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

impl Session {
    fn new(ttl: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            token: generate_secure_token(),
            user: None,
            flashes: Vec::new(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

/// Session manager for cookie tokens
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SESSION_TTL)
    }
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(ttl: Duration) -> Self {
        SessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a new anonymous session
    pub async fn create_session(&self) -> Session {
        let session = Session::new(self.ttl);

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());

        counter!(keys::SESSION_CREATED).increment(1);
        gauge!(keys::SESSION_ACTIVE).set(sessions.len() as f64);

        session
    }

    /// Get a live session by token
    pub async fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| !s.is_expired(SystemTime::now()))
            .cloned()
    }

    /// Attach a user to a session. The old token is retired and a fresh one
    /// issued so a pre-login token can never carry an authenticated identity.
    pub async fn login(&self, old_token: &str, user: SessionUser) -> Session {
        let mut sessions = self.sessions.write().await;
        let carried = sessions
            .remove(old_token)
            .map(|s| s.flashes)
            .unwrap_or_default();

        let mut session = Session::new(self.ttl);
        session.user = Some(user);
        session.flashes = carried;
        sessions.insert(session.token.clone(), session.clone());

        counter!(keys::SESSION_CREATED).increment(1);
        gauge!(keys::SESSION_ACTIVE).set(sessions.len() as f64);

        session
    }

    /// Remove a session by token
    pub async fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        gauge!(keys::SESSION_ACTIVE).set(sessions.len() as f64);
    }

    /// Queue a flash message. Returns false when the session is unknown.
    pub async fn push_flash(&self, token: &str, flash: Flash) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) => {
                session.flashes.push(flash);
                true
            },
            None => false,
        }
    }

    /// Drain queued flash messages
    pub async fn take_flashes(&self, token: &str) -> Vec<Flash> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get_mut(token)
            .map(|s| std::mem::take(&mut s.flashes))
            .unwrap_or_default()
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = SystemTime::now();
        let before_count = sessions.len();

        sessions.retain(|_, session| !session.is_expired(now));

        let after_count = sessions.len();
        let removed = before_count - after_count;

        if removed > 0 {
            counter!(keys::SESSION_EXPIRED).increment(removed as u64);
            gauge!(keys::SESSION_ACTIVE).set(after_count as f64);
            tracing::debug!(removed, remaining = after_count, "purged expired sessions");
        }

        removed
    }

    /// Spawn a background task that periodically purges expired sessions
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                manager.purge_expired().await;
            }
        })
    }
}
