use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheError, ListCache};

/// In-process fallback cache, used in development and whenever no Redis URL
/// is configured. Expired entries are dropped lazily on read.
pub struct MemoryListCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryListCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryListCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListCache for MemoryListCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Entry was stale at read time; evict it unless a writer refreshed
        // the key between the two lock acquisitions.
        let mut entries = self.entries.write().await;
        if let Some((_, expires_at)) = entries.get(key) {
            if *expires_at <= now {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn purge_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_within_ttl() {
        let cache = MemoryListCache::new();
        cache
            .put("asset_list:a", "[1]", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("asset_list:a").await.unwrap(),
            Some("[1]".to_string())
        );
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = MemoryListCache::new();
        cache
            .put("asset_list:a", "[1]", Duration::from_secs(0))
            .await
            .unwrap();
        assert_eq!(cache.get("asset_list:a").await.unwrap(), None);
        // The stale entry is also physically gone.
        assert_eq!(cache.purge_prefix("asset_list:").await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stale_eviction_never_discards_a_racing_refresh() {
        use std::sync::Arc;

        let cache = Arc::new(MemoryListCache::new());
        for _ in 0..200 {
            cache
                .put("asset_list:a", "old", Duration::from_secs(0))
                .await
                .unwrap();

            let reader = {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let _ = cache.get("asset_list:a").await;
                })
            };
            let writer = {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .put("asset_list:a", "new", Duration::from_secs(60))
                        .await
                        .unwrap();
                })
            };
            let _ = tokio::join!(reader, writer);

            // Whatever the interleaving, the fresh value must survive.
            assert_eq!(
                cache.get("asset_list:a").await.unwrap(),
                Some("new".to_string())
            );
        }
    }

    #[tokio::test]
    async fn purge_prefix_counts_and_spares_other_scopes() {
        let cache = MemoryListCache::new();
        let ttl = Duration::from_secs(60);
        cache.put("asset_list:a", "[]", ttl).await.unwrap();
        cache.put("asset_list:b", "[]", ttl).await.unwrap();
        cache.put("employee_list:a", "[]", ttl).await.unwrap();

        assert_eq!(cache.purge_prefix("asset_list:").await.unwrap(), 2);
        assert_eq!(cache.get("asset_list:a").await.unwrap(), None);
        assert_eq!(
            cache.get("employee_list:a").await.unwrap(),
            Some("[]".to_string())
        );
    }
}
