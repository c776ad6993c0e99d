//! In-process TTL cache.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Concurrent map whose entries expire `ttl` after insertion.
///
/// Expired entries are dropped lazily on read, or in bulk by
/// [`MemoryCache::purge_expired`].
#[derive(Debug)]
pub struct MemoryCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, (V, Instant)>,
    ttl: Duration,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            let (value, stored_at) = entry.value();
            if stored_at.elapsed() < self.ttl {
                return Some(value.clone());
            }
        }

        // The read guard is released above; removing while holding it deadlocks.
        self.entries
            .remove_if(key, |_, (_, stored_at)| stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (value, Instant::now()));
    }

    /// Returns whether an entry was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, (_, stored_at)| stored_at.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache: MemoryCache<u32, String> = MemoryCache::new(Duration::from_secs(60));
        cache.insert(1, "teacher".to_string());

        assert_eq!(cache.get(&1), Some("teacher".to_string()));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache: MemoryCache<u32, String> = MemoryCache::new(Duration::ZERO);
        cache.insert(1, "teacher".to_string());

        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let cache: MemoryCache<u32, u32> = MemoryCache::new(Duration::from_secs(60));
        cache.insert(1, 10);

        assert!(cache.invalidate(&1));
        assert!(!cache.invalidate(&1));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_purge_expired() {
        let cache: MemoryCache<u32, u32> = MemoryCache::new(Duration::ZERO);
        cache.insert(1, 10);
        cache.insert(2, 20);

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_insert_overwrites() {
        let cache: MemoryCache<u32, u32> = MemoryCache::new(Duration::from_secs(60));
        cache.insert(1, 10);
        cache.insert(1, 11);

        assert_eq!(cache.get(&1), Some(11));
        assert_eq!(cache.len(), 1);
    }
}
