//! Active-session registry (token revocation)
//!
//! A signed token cannot be un-signed, so logout needs a side channel.
//! Rather than a blacklist, the registry tracks the *active* marker:
//! login writes `token -> user_id` with a TTL equal to the token
//! lifetime, logout atomically deletes it, and `is_active` is an
//! existence check. A marker therefore never outlives the token it
//! belongs to, and a revoked token stays revoked until it would have
//! expired anyway.
//!
//! The registry is shared mutable state across workers, which may be
//! separate processes; conflicting writes are serialized by the store
//! (single-key SET/DEL), never by in-process locks. The Redis
//! implementation is the production one; [`InMemorySessionStore`] is a
//! test double for single-process tests only.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;

/// Registry store failures
#[derive(Error, Debug)]
pub enum SessionStoreError {
    /// Logout of a token with no active marker (never issued here,
    /// already logged out, or expired)
    #[error("token is not tracked as active")]
    NotLoggedIn,
    /// Backend connectivity or protocol error
    #[error("session store backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for SessionStoreError {
    fn from(err: redis::RedisError) -> Self {
        SessionStoreError::Backend(err.to_string())
    }
}

/// Durable key-value store tracking which tokens are currently active
#[async_trait]
pub trait ActiveSessionStore: Send + Sync {
    /// Record a freshly issued token as active, expiring after `ttl_secs`
    async fn register_active(
        &self,
        token: &str,
        user_id: i64,
        ttl_secs: i64,
    ) -> Result<(), SessionStoreError>;

    /// Remove the active marker for a token
    ///
    /// Returns `NotLoggedIn` if no marker exists. Removal is a single
    /// atomic delete, so exactly one of N concurrent logouts succeeds.
    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError>;

    /// Whether the token is currently tracked as active
    async fn is_active(&self, token: &str) -> Result<bool, SessionStoreError>;
}

/// Redis-backed registry
///
/// `ConnectionManager` multiplexes and reconnects internally, so the
/// store is cheap to clone into worker tasks.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ActiveSessionStore for RedisSessionStore {
    async fn register_active(
        &self,
        token: &str,
        user_id: i64,
        ttl_secs: i64,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        // SET with EX: the marker self-expires exactly when the token does
        let _: () = conn
            .set_ex(token, user_id, ttl_secs.max(1) as u64)
            .await?;
        Ok(())
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(token).await?;
        if removed == 0 {
            return Err(SessionStoreError::NotLoggedIn);
        }
        Ok(())
    }

    async fn is_active(&self, token: &str) -> Result<bool, SessionStoreError> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(token).await?)
    }
}

/// In-process registry honoring TTLs on read
///
/// Test double only: it cannot serialize writes across worker
/// processes, which the production deployment requires.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: tokio::sync::Mutex<std::collections::HashMap<String, (i64, std::time::Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActiveSessionStore for InMemorySessionStore {
    async fn register_active(
        &self,
        token: &str,
        user_id: i64,
        ttl_secs: i64,
    ) -> Result<(), SessionStoreError> {
        let deadline =
            std::time::Instant::now() + std::time::Duration::from_secs(ttl_secs.max(0) as u64);
        self.entries
            .lock()
            .await
            .insert(token.to_string(), (user_id, deadline));
        Ok(())
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().await;
        match entries.remove(token) {
            Some((_, deadline)) if deadline > std::time::Instant::now() => Ok(()),
            // Expired entries behave as if Redis had already dropped them
            _ => Err(SessionStoreError::NotLoggedIn),
        }
    }

    async fn is_active(&self, token: &str) -> Result<bool, SessionStoreError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(token)
            .map(|(_, deadline)| *deadline > std::time::Instant::now())
            .unwrap_or(false))
    }
}
