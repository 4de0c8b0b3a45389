//! Process-wide memoization with a fixed time-to-live.
//!
//! Entries are served while `now - created_at < ttl` and recomputed on the
//! first request that finds them stale. Every miss also sweeps out stale
//! entries, so keys that are never asked for again do not pile up. Concurrent
//! misses on the same key may each run the producer; the last writer wins.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::debug;

use crate::models::DateRange;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Series(u32),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scope: CacheScope,
    pub range: DateRange,
}

impl CacheKey {
    pub fn series(series_id: u32, range: DateRange) -> Self {
        Self { scope: CacheScope::Series(series_id), range }
    }

    pub fn all(range: DateRange) -> Self {
        Self { scope: CacheScope::All, range }
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    created_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or(Duration::MAX)
    }

    /// The cached value, if present and younger than the TTL.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| now - entry.created_at < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Stores `value` stamped with the current time, replacing any entry.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            created_at: self.clock.now(),
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
        value
    }

    /// Serves a fresh entry or runs `producer` and caches whatever it returns,
    /// empty results included.
    pub async fn get_or_compute<F, Fut>(&self, key: K, producer: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(hit) = self.get(&key) {
            debug!("cache hit: {:?}", key);
            return hit;
        }

        debug!("cache miss: {:?}", key);
        let value = producer().await;
        self.purge_expired();
        self.insert(key, value)
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but an `Err` from the
    /// producer is returned without being cached.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: K, producer: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            debug!("cache hit: {:?}", key);
            return Ok(hit);
        }

        debug!("cache miss: {:?}", key);
        let value = producer().await?;
        self.purge_expired();
        Ok(self.insert(key, value))
    }

    /// Drops stale entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| now - entry.created_at < self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("cache purged {} stale entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
