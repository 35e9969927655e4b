//! Time-bounded caching of table snapshots
//!
//! Entries are stored in a bounded moka cache, but freshness is decided
//! lazily on access against an injectable [`Clock`], so expiry is exact and
//! testable. An entry stored at `t` is served while `now - t < ttl`.

use crate::config::CacheSettings;
use moka::future::Cache;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of the current time in milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually driven clock for deterministic tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: u64,
}

/// Key/value cache with per-call TTL and lazy expiry
pub struct TtlCache<V> {
    entries: Cache<String, Entry<V>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache backed by the wall clock
    pub fn new(default_ttl: Duration, max_capacity: u64) -> Self {
        Self::with_clock(default_ttl, max_capacity, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock
    pub fn with_clock(default_ttl: Duration, max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder().max_capacity(max_capacity).build();

        Self {
            entries,
            clock,
            default_ttl,
        }
    }

    pub fn from_settings(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(settings.ttl(), settings.max_capacity, clock)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn is_fresh(&self, entry: &Entry<V>, ttl: Duration) -> bool {
        let age = self.clock.now_ms().saturating_sub(entry.stored_at);
        u128::from(age) < ttl.as_millis()
    }

    /// Get a fresh value using the default TTL
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_with_ttl(key, self.default_ttl).await
    }

    /// Get a value if it is younger than `ttl`
    pub async fn get_with_ttl(&self, key: &str, ttl: Duration) -> Option<V> {
        let entry = self.entries.get(key).await?;
        if self.is_fresh(&entry, ttl) {
            Some(entry.value)
        } else {
            None
        }
    }

    /// Store a value stamped with the current time, replacing any prior entry
    pub async fn put(&self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now_ms();
        self.entries.insert(key.into(), Entry { value, stored_at }).await;
    }

    /// Remove a single entry
    pub async fn remove(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate number of stored entries, fresh or not
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_fetch_with_ttl(key, self.default_ttl, fetch).await
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch) with an explicit TTL.
    ///
    /// A failed fetch writes nothing and its error is returned; an expired
    /// entry is never handed out in its place. The entry is stamped with the
    /// time of the lookup, before the fetch starts.
    pub async fn get_or_fetch_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key).await {
            if self.is_fresh(&entry, ttl) {
                debug!("Cache hit for {}", key);
                return Ok(entry.value);
            }
        }

        debug!("Cache miss for {}", key);
        let value = fetch().await?;
        self.entries
            .insert(
                key.to_string(),
                Entry {
                    value: value.clone(),
                    stored_at: now,
                },
            )
            .await;

        Ok(value)
    }
}

/// Cache key for a sheet snapshot
pub fn table_cache_key(table: &str) -> String {
    format!("sheet_{}", table)
}
