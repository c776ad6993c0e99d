//! Redis cache client.
//!
//! Values are stored as JSON. Read errors are logged and reported as a miss so
//! that a Redis outage degrades to store lookups instead of failing checks.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is invalid or the server is
    /// unreachable.
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }

    /// Returns `None` on a miss, on a Redis error and on undecodable JSON.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => match serde_json::from_str(&value) {
                Ok(parsed) => {
                    debug!(cache.key = %key, "Cache hit");
                    Some(parsed)
                }
                Err(e) => {
                    error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                    None
                }
            },
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis GET error");
                None
            }
        }
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)?;

        // SETEX rejects a zero expiry.
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, json, secs).await?;

        debug!(cache.key = %key, cache.ttl_secs = %secs, "Cache set");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await?;

        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }

    /// Deletes every key matching `pattern`, using SCAN so Redis is not blocked.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct CachedScope {
        roles: Vec<String>,
        school: Option<String>,
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_invalidate() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();
        let ttl = Duration::from_secs(60);

        let scope = CachedScope {
            roles: vec!["teacher".to_string()],
            school: Some("s1".to_string()),
        };

        cache.set_with_ttl("pei:test:scope", &scope, ttl).await.unwrap();
        let cached: Option<CachedScope> = cache.get("pei:test:scope").await;
        assert_eq!(cached, Some(scope));

        cache.invalidate("pei:test:scope").await.unwrap();
        let cached: Option<CachedScope> = cache.get("pei:test:scope").await;
        assert_eq!(cached, None);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_invalidate_pattern() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();
        let ttl = Duration::from_secs(60);

        cache.set_with_ttl("pei:test:pattern:a", &1, ttl).await.unwrap();
        cache.set_with_ttl("pei:test:pattern:b", &2, ttl).await.unwrap();

        let deleted = cache.invalidate_pattern("pei:test:pattern:*").await.unwrap();
        assert_eq!(deleted, 2);
    }
}
