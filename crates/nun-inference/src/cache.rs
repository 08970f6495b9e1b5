//! Memoization of capability calls.
//!
//! Results are keyed by the exact serialized input. Eviction is
//! least-recently-used beyond the configured capacity, and an optional TTL
//! turns stale entries into misses.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::CacheConfig;

struct CachedValue<V> {
    value: V,
    stored_at: Instant,
}

/// Bounded key/value memo shared across queries.
pub struct MemoCache<V> {
    entries: Mutex<LruCache<String, CachedValue<V>>>,
    ttl: Option<Duration>,
}

impl<V: Clone> MemoCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl())
    }

    /// Return a live entry, dropping it if it has outlived the TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(cached) => self
                .ttl
                .is_some_and(|ttl| cached.stored_at.elapsed() > ttl),
            None => return None,
        };

        if expired {
            entries.pop(key);
            return None;
        }

        entries.get(key).map(|cached| cached.value.clone())
    }

    pub async fn put(&self, key: String, value: V) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key,
            CachedValue {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_after_put() {
        let cache = MemoCache::new(4, None);
        cache.put("fractura de cadera".to_string(), 1u32).await;

        assert_eq!(cache.get("fractura de cadera").await, Some(1));
        assert_eq!(cache.get("fractura de cadera ").await, None);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoCache::new(2, None);
        cache.put("a".to_string(), 1u32).await;
        cache.put("b".to_string(), 2u32).await;
        // Touch "a" so "b" becomes least recently used.
        assert_eq!(cache.get("a").await, Some(1));
        cache.put("c".to_string(), 3u32).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = MemoCache::new(4, Some(Duration::from_secs(60)));
        cache.put("a".to_string(), 1u32).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.get("a").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_capacity_still_holds_one() {
        let cache = MemoCache::new(0, None);
        cache.put("a".to_string(), 1u32).await;
        assert_eq!(cache.get("a").await, Some(1));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoCache::from_config(&CacheConfig::default());
        cache.put("a".to_string(), 1u32).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
