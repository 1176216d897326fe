use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::cache::{Invalidator, ListCache, ResponseCache};
use crate::config::config;

/// Shared handler state: the connection pool plus the response cache.
/// Write paths derive an [`Invalidator`] from the same cache backend, so
/// whatever the read side stored is what the write side purges.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(pool: PgPool, backend: Arc<dyn ListCache>) -> Self {
        let settings = &config().cache;
        let cache = ResponseCache::new(
            backend,
            settings.key_prefix.clone(),
            Duration::from_secs(settings.list_ttl_secs),
        );
        Self { pool, cache }
    }

    pub fn invalidator(&self) -> Invalidator {
        self.cache.invalidator()
    }
}
