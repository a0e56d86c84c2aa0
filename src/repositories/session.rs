use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::error::{AppError, Result};

/// Key/value storage with expiry, keyed by session token.
///
/// Values are opaque sealed bytes; the store never sees plaintext sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes `value` under `token`, replacing any previous value, to be
    /// dropped after `ttl`.
    async fn put(&self, token: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Overwrites `token` only if it is still stored.
    ///
    /// Returns `false` and writes nothing when the record is gone.
    async fn replace(&self, token: &str, value: Vec<u8>, ttl: Duration) -> Result<bool>;

    async fn get(&self, token: &str) -> Result<Option<Vec<u8>>>;

    async fn delete(&self, token: &str) -> Result<()>;
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Session store backed by Redis `SET EX` keys.
///
/// Renewals use `SET XX` so a key deleted by a logout is never recreated.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        // SET EX rejects zero.
        let seconds = ttl.as_secs().max(1);
        let _: () = self
            .redis
            .clone()
            .set_ex(session_key(token), value, seconds)
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set_ex failed: {}", e);
                AppError::Redis(e)
            })?;
        Ok(())
    }

    async fn replace(&self, token: &str, value: Vec<u8>, ttl: Duration) -> Result<bool> {
        let reply: Option<String> = redis::cmd("SET")
            .arg(session_key(token))
            .arg(value)
            .arg("XX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut self.redis.clone())
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis SET XX failed: {}", e);
                AppError::Redis(e)
            })?;
        Ok(reply.is_some())
    }

    async fn get(&self, token: &str) -> Result<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = self.redis.clone().get(session_key(token)).await?;
        Ok(value)
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let _: () = self.redis.clone().del(session_key(token)).await?;
        Ok(())
    }
}
