//! Result cache - LRU cache over executed catalog queries
//!
//! The Table Store is immutable after load and every catalog query is
//! deterministic, so a cached ResultSet never goes stale. Entries are keyed
//! by query id plus canonicalized parameters and shared as `Arc` so repeated
//! dashboard requests return without re-aggregating.

use crate::query::ResultSet;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Cache key: "query_id?name=value&..." with parameters in sorted order.
pub type CacheKey = String;

const DEFAULT_CAPACITY: usize = 64;

/// Cache statistics
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of executed query results.
pub struct ResultCache {
    cache: Mutex<LruCache<CacheKey, Arc<ResultSet>>>,
    stats: Mutex<CacheStats>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).expect("non-zero default"));
        let mut stats = CacheStats::default();
        stats.capacity = capacity.get();
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(stats),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<ResultSet>> {
        let hit = self.cache.lock().get(key).cloned();
        let mut stats = self.stats.lock();
        match hit {
            Some(rs) => {
                stats.hits += 1;
                Some(rs)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, result: Arc<ResultSet>) {
        let mut cache = self.cache.lock();
        cache.put(key, result);
        self.stats.lock().size = cache.len();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
        let mut stats = self.stats.lock();
        stats.size = 0;
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ColumnMeta;
    use crate::types::ColumnType;

    fn result() -> Arc<ResultSet> {
        Arc::new(ResultSet::new(vec![ColumnMeta::new(
            "n",
            ColumnType::Integer,
        )]))
    }

    #[test]
    fn test_hit_miss_accounting() {
        let cache = ResultCache::new(2);
        assert!(cache.get("a").is_none());
        cache.put("a".into(), result());
        assert!(cache.get("a").is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResultCache::new(2);
        cache.put("a".into(), result());
        cache.put("b".into(), result());
        cache.put("c".into(), result());
        assert!(cache.get("a").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_clear() {
        let cache = ResultCache::new(2);
        cache.put("a".into(), result());
        cache.clear();
        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats().size, 0);
    }
}
