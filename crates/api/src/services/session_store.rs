//! In-memory session registry.
//!
//! Sessions are keyed by the SHA-256 hex of the session token; raw tokens
//! never stay in memory past the call that presents them.

use chrono::{DateTime, Duration, Utc};
use domain::models::AuthenticatedUser;
use shared::clock::Clock;
use shared::crypto::sha256_hex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A live session, as seen by request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user: AuthenticatedUser,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredSession {
    user: AuthenticatedUser,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Registry of sessions established through the login flow.
pub struct SessionStore {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl SessionStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register `token` for `user`, replacing any session with the same token.
    pub async fn insert(&self, token: &str, user: AuthenticatedUser) -> SessionContext {
        let now = self.clock.now();
        let token_hash = sha256_hex(token);
        let stored = StoredSession {
            user,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let context = SessionContext {
            user: stored.user.clone(),
            token_hash: token_hash.clone(),
            created_at: stored.created_at,
            expires_at: stored.expires_at,
        };

        self.sessions.write().await.insert(token_hash, stored);
        context
    }

    /// Look up the session for `token`. Expired sessions are dropped.
    pub async fn resolve(&self, token: &str) -> Option<SessionContext> {
        let token_hash = sha256_hex(token);
        let now = self.clock.now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(&token_hash) {
                None => return None,
                Some(stored) if stored.expires_at > now => {
                    return Some(SessionContext {
                        user: stored.user.clone(),
                        token_hash,
                        created_at: stored.created_at,
                        expires_at: stored.expires_at,
                    });
                }
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions
            .get(&token_hash)
            .is_some_and(|stored| stored.expires_at <= now)
        {
            sessions.remove(&token_hash);
            tracing::debug!("Dropped expired session");
        }
        None
    }

    /// Remove the session identified by its token hash. Returns whether a
    /// session was removed.
    pub async fn revoke(&self, token_hash: &str) -> bool {
        self.sessions.write().await.remove(token_hash).is_some()
    }

    /// Remove every expired session and return how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| stored.expires_at > now);
        before - sessions.len()
    }

    /// Number of sessions currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
