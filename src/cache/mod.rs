pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;

/// Errors from a cache backend. These never cross the HTTP boundary; the
/// call sites downgrade them to warnings.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Invalidation scopes. Every cached list response is keyed under exactly
/// one of these tags so writers can purge whole families of keys without
/// knowing individual query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    AssetList,
    AssetHistory,
    EmployeeList,
}

impl CacheScope {
    pub fn tag(&self) -> &'static str {
        match self {
            CacheScope::AssetList => "asset_list",
            CacheScope::AssetHistory => "asset_history",
            CacheScope::EmployeeList => "employee_list",
        }
    }
}

/// Injected list-response cache. Implementations must be shareable across
/// handlers; all methods are best-effort from the caller's point of view.
#[async_trait]
pub trait ListCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drop every entry whose key starts with `prefix`, returning how many
    /// were removed.
    async fn purge_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
}

/// Pick the backend from configuration: Redis when a URL is configured and
/// reachable, otherwise the in-process map.
pub async fn connect_from_config(settings: &CacheConfig) -> Arc<dyn ListCache> {
    match &settings.redis_url {
        Some(url) => match self::redis::RedisListCache::connect(url).await {
            Ok(cache) => {
                info!("Using Redis list cache");
                Arc::new(cache)
            }
            Err(e) => {
                warn!("Redis cache unavailable ({}), using in-process cache", e);
                Arc::new(memory::MemoryListCache::new())
            }
        },
        None => Arc::new(memory::MemoryListCache::new()),
    }
}

fn scope_prefix(key_prefix: &str, scope: CacheScope) -> String {
    format!("{}{}:", key_prefix, scope.tag())
}

/// Read/write side of the list cache, handed to handlers through the
/// application state. Keys are scope-tagged digests of the request path and
/// query string. Backend failures degrade to cache misses.
#[derive(Clone)]
pub struct ResponseCache {
    backend: Arc<dyn ListCache>,
    key_prefix: String,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn ListCache>, key_prefix: String, ttl: Duration) -> Self {
        Self {
            backend,
            key_prefix,
            ttl,
        }
    }

    pub fn response_key(&self, scope: CacheScope, path_and_query: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(path_and_query.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("{}{}", scope_prefix(&self.key_prefix, scope), &digest[..16])
    }

    pub async fn lookup(&self, key: &str) -> Option<serde_json::Value> {
        match self.backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn store(&self, key: &str, value: &serde_json::Value) {
        if let Err(e) = self.backend.put(key, &value.to_string(), self.ttl).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }

    /// The write-side handle used by services after commit.
    pub fn invalidator(&self) -> Invalidator {
        Invalidator {
            backend: self.backend.clone(),
            key_prefix: self.key_prefix.clone(),
        }
    }
}

/// Post-commit hook that purges every cached response in a scope. Purge
/// failures are logged and swallowed: a cache outage must never fail the
/// write that triggered it.
#[derive(Clone)]
pub struct Invalidator {
    backend: Arc<dyn ListCache>,
    key_prefix: String,
}

impl Invalidator {
    pub fn new(backend: Arc<dyn ListCache>, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            key_prefix: key_prefix.into(),
        }
    }

    pub async fn invalidate(&self, scope: CacheScope) {
        let prefix = scope_prefix(&self.key_prefix, scope);
        match self.backend.purge_prefix(&prefix).await {
            Ok(0) => {}
            Ok(n) => debug!("Purged {} cached responses for scope {}", n, scope.tag()),
            Err(e) => warn!("Cache invalidation failed for scope {}: {}", scope.tag(), e),
        }
    }
}
