use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::{CacheError, ListCache};

fn backend_err(e: redis::RedisError) -> CacheError {
    CacheError::Backend(e.to_string())
}

/// Redis-backed list cache. The connection manager reconnects on its own,
/// so a transient outage shows up here as errors rather than hangs.
///
/// Scope purges use KEYS + DEL; the keyspace holds at most a handful of
/// list responses per scope.
pub struct RedisListCache {
    conn: ConnectionManager,
}

impl RedisListCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(backend_err)?;
        let conn = ConnectionManager::new(client).await.map_err(backend_err)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl ListCache for RedisListCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(backend_err)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(backend_err)
    }

    async fn purge_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(backend_err)?;

        if keys.is_empty() {
            return Ok(0);
        }

        redis::cmd("DEL")
            .arg(&keys)
            .query_async::<_, u64>(&mut conn)
            .await
            .map_err(backend_err)
    }
}
