use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::trace;

use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// An entry is stale once strictly more than `ttl` has elapsed.
    fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// String-keyed cache where each entry carries its own TTL.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use erpbridge_common::cache::TtlCache;
///
/// let cache: TtlCache<u32> = TtlCache::new();
/// cache.put("answer", 42, Duration::from_secs(60));
/// assert_eq!(cache.get("answer"), Some(42));
/// ```
pub struct TtlCache<V, C = SystemClock>
where
    C: Clock,
{
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    metrics: MetricsCollector,
    clock: C,
}

impl<V: Clone> TtlCache<V, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<V: Clone> Default for TtlCache<V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> TtlCache<V, C>
where
    V: Clone,
    C: Clock,
{
    /// Create a cache driven by a custom clock (useful for testing)
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Store `value` under `key`, replacing any previous entry and its TTL.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry { value, stored_at: self.clock.now(), ttl };
        self.entries.write().insert(key.into(), entry);
    }

    /// Fetch a fresh value. A stale entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => {
                    self.metrics.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_stale(now) => {
                    self.metrics.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock; another writer may have refreshed it.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if !entry.is_stale(now) => {
                self.metrics.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.metrics.record_expirations(1);
                self.metrics.record_miss();
                trace!(key, "cache entry expired");
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Remove one entry. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop every stale entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(now));
        let removed = before - entries.len();
        self.metrics.record_expirations(removed as u64);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
            hits: self.metrics.hits(),
            misses: self.metrics.misses(),
            expirations: self.metrics.expirations(),
        }
    }
}

impl<V, C: Clock> std::fmt::Debug for TtlCache<V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("size", &self.entries.read().len()).finish()
    }
}
