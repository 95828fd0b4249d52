use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::session::Session;

/// Prefix of every swipe session key.
pub const SESSION_KEY_PREFIX: &str = "view_profile:";

/// Builds the cache key for an identity.
pub fn session_key(email: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, email)
}

/// Key-value storage for swipe sessions.
///
/// Entries expire on their own; there is no delete operation.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `email`, or `None` if absent or expired.
    async fn get(&self, email: &str) -> Result<Option<Session>>;

    /// Stores the session and restarts its time-to-live.
    async fn put(&self, email: &str, session: &Session, ttl: Duration) -> Result<()>;

    /// Replaces an existing session without touching its remaining lifetime.
    ///
    /// Does nothing if the entry has already expired.
    async fn put_keep_ttl(&self, email: &str, session: &Session) -> Result<()>;
}

/// Sessions kept in Redis as JSON strings.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
    timeout: Duration,
}

impl RedisSessionStore {
    /// Creates a new `RedisSessionStore`.
    ///
    /// # Arguments
    ///
    /// * `redis` - The Redis connection manager.
    /// * `timeout` - Upper bound for a single Redis round trip.
    pub fn new(redis: ConnectionManager, timeout: Duration) -> Self {
        Self { redis, timeout }
    }

    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = redis::RedisResult<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                tracing::error!("❌ Redis {} failed: {}", op, e);
                AppError::Redis(e)
            }),
            Err(_) => {
                tracing::error!("❌ Redis {} timed out after {:?}", op, self.timeout);
                Err(AppError::Internal(format!("redis {} timed out", op)))
            }
        }
    }
}

fn encode(session: &Session) -> Result<String> {
    sonic_rs::to_string(session)
        .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, email: &str) -> Result<Option<Session>> {
        let mut conn = self.redis.clone();
        let key = session_key(email);
        let raw: Option<String> = self.bounded("GET", conn.get(&key)).await?;

        match raw {
            Some(json) => {
                let session: Session = sonic_rs::from_str(&json).map_err(|e| {
                    tracing::warn!("❌ Invalid session JSON at {}: {}", key, e);
                    AppError::Internal(format!("Session deserialization failed: {}", e))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, email: &str, session: &Session, ttl: Duration) -> Result<()> {
        let mut conn = self.redis.clone();
        let json = encode(session)?;
        let key = session_key(email);
        let seconds = ttl.as_secs().max(1);

        let _: () = self
            .bounded("SET EX", conn.set_ex(&key, &json, seconds))
            .await?;

        tracing::debug!("✅ Session saved to Redis: {}", key);
        Ok(())
    }

    async fn put_keep_ttl(&self, email: &str, session: &Session) -> Result<()> {
        let mut conn = self.redis.clone();
        let json = encode(session)?;
        let key = session_key(email);

        // XX keeps an expired key from coming back without a TTL.
        let reply: Option<String> = self
            .bounded(
                "SET KEEPTTL",
                redis::cmd("SET")
                    .arg(&key)
                    .arg(&json)
                    .arg("XX")
                    .arg("KEEPTTL")
                    .query_async(&mut conn),
            )
            .await?;

        if reply.is_none() {
            tracing::debug!("Session {} expired before update, skipped", key);
        }
        Ok(())
    }
}

/// Sessions kept in process memory.
///
/// Expired entries are dropped when read and swept on every write.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, (Session, Instant)>>>,
}

impl MemorySessionStore {
    /// Creates a new, empty `MemorySessionStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// When the entry for `email` expires, if it is still live.
    pub async fn expires_at(&self, email: &str) -> Option<Instant> {
        let entries = self.entries.lock().await;
        entries
            .get(&session_key(email))
            .map(|(_, deadline)| *deadline)
            .filter(|deadline| *deadline > Instant::now())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, email: &str) -> Result<Option<Session>> {
        let key = session_key(email);
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(&key) {
            Some((_, deadline)) => *deadline <= Instant::now(),
            None => return Ok(None),
        };

        if expired {
            entries.remove(&key);
            return Ok(None);
        }
        Ok(entries.get(&key).map(|(session, _)| session.clone()))
    }

    async fn put(&self, email: &str, session: &Session, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, deadline)| *deadline > now);
        entries.insert(session_key(email), (session.clone(), now + ttl));
        Ok(())
    }

    async fn put_keep_ttl(&self, email: &str, session: &Session) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if let Some((stored, deadline)) = entries.get_mut(&session_key(email)) {
            if *deadline > Instant::now() {
                *stored = session.clone();
            }
        }
        Ok(())
    }
}
