//! A generic per-kind LRU+TTL cache with monotone replacement: an existing
//! entry is only overwritten by an insert that reports itself as "at least
//! as good" along the caller-supplied quality dimension (e.g. engine depth).
//!
//! Grounded on the teacher's `game/search/tt.rs` (hash-keyed fixed-capacity
//! slot table) and `evaluation_cache.rs`, generalized from a single
//! special-purpose table into `LruTtlCache<K, V>`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_used: Instant,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
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

/// `is_upgrade(existing, candidate) -> bool` decides monotone replacement.
pub struct LruTtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    stats: CacheStats,
}

impl<K: std::hash::Hash + Eq + Clone, V> LruTtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes entries whose TTL has elapsed. Returns the number evicted.
    pub fn prune(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        let evicted = before - self.entries.len();
        self.stats.evictions += evicted as u64;
        evicted
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let ttl = self.ttl;
        let hit = matches!(self.entries.get(key), Some(e) if e.inserted_at.elapsed() < ttl);
        if hit {
            self.stats.hits += 1;
            let entry = self.entries.get_mut(key).unwrap();
            entry.last_used = Instant::now();
            self.entries.get(key).map(|e| &e.value)
        } else {
            self.stats.misses += 1;
            if self.entries.contains_key(key) {
                // expired
                self.entries.remove(key);
                self.stats.evictions += 1;
            }
            None
        }
    }

    /// Inserts `value` for `key`. `is_upgrade(existing, &value)` is consulted
    /// when a live (non-expired) entry already exists; the insert is a no-op
    /// if it returns `false`. Returns `true` if the store changed.
    pub fn insert_if_upgrade(&mut self, key: K, value: V, is_upgrade: impl Fn(&V, &V) -> bool) -> bool {
        let ttl = self.ttl;
        if let Some(existing) = self.entries.get(&key) {
            if existing.inserted_at.elapsed() < ttl && !is_upgrade(&existing.value, &value) {
                return false;
            }
        }
        self.evict_if_full(&key);
        let now = Instant::now();
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
                last_used: now,
            },
        );
        true
    }

    fn evict_if_full(&mut self, incoming_key: &K) {
        if self.entries.len() < self.capacity || self.entries.contains_key(incoming_key) {
            return;
        }
        if let Some(lru_key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone())
        {
            self.entries.remove(&lru_key);
            self.stats.evictions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used_when_full() {
        let mut cache: LruTtlCache<u32, u32> = LruTtlCache::new(2, Duration::from_secs(60));
        cache.insert_if_upgrade(1, 10, |_, _| true);
        cache.insert_if_upgrade(2, 20, |_, _| true);
        // touch key 1 so key 2 becomes LRU
        let _ = cache.get(&1);
        cache.insert_if_upgrade(3, 30, |_, _| true);
        assert!(cache.get(&2).is_none());
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&3).is_some());
    }

    #[test]
    fn monotone_replacement_rejects_downgrade() {
        let mut cache: LruTtlCache<u32, u32> = LruTtlCache::new(8, Duration::from_secs(60));
        cache.insert_if_upgrade(1, 18, |existing, candidate| candidate >= existing);
        let changed = cache.insert_if_upgrade(1, 12, |existing, candidate| candidate >= existing);
        assert!(!changed);
        assert_eq!(*cache.get(&1).unwrap(), 18);

        let changed = cache.insert_if_upgrade(1, 22, |existing, candidate| candidate >= existing);
        assert!(changed);
        assert_eq!(*cache.get(&1).unwrap(), 22);
    }

    #[test]
    fn prune_removes_expired_entries() {
        let mut cache: LruTtlCache<u32, u32> = LruTtlCache::new(8, Duration::from_millis(1));
        cache.insert_if_upgrade(1, 10, |_, _| true);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.prune(), 1);
        assert!(cache.is_empty());
    }
}
