//! Transaction query cache implementation using Moka

use super::keys::CacheKey;
use crate::models::IndexedTransaction;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

/// Caches pages of transaction query results with their total count
#[derive(Clone)]
pub struct TransactionCacheManager {
    cache: Cache<CacheKey, (Vec<IndexedTransaction>, i64)>,
}

impl TransactionCacheManager {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<(Vec<IndexedTransaction>, i64)> {
        let result = self.cache.get(key).await;
        if result.is_some() {
            debug!("Cache hit for key: {}", key);
        } else {
            debug!("Cache miss for key: {}", key);
        }
        result
    }

    pub async fn insert(&self, key: CacheKey, value: (Vec<IndexedTransaction>, i64)) {
        debug!("Caching transaction page for key: {}", key);
        self.cache.insert(key, value).await;
    }
}
