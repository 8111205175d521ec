//! In-memory HTML cache with per-entry TTL

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Prefix of every page key; external tooling relies on this shape
pub const CACHE_KEY_PREFIX: &str = "scraped_html:";

/// Cache key for a page URL
pub fn cache_key(url: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, url)
}

/// Raw HTML memoized per key.
///
/// Entries are never refreshed in place: once expired they are treated as
/// missing and replaced by the next successful fetch. Concurrent misses on the
/// same key wait on a per-key lock so only one producer runs at a time.
#[derive(Debug, Default)]
pub struct HtmlCache {
    entries: RwLock<HashMap<String, CachedHtml>>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

#[derive(Debug, Clone)]
struct CachedHtml {
    html: String,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CachedHtml {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

/// Holds a key's in-flight lock; releases the map slot on drop, unwinding included
struct InFlight<'a> {
    cache: &'a HtmlCache,
    key: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .cache
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Map plus our handle: nobody else is waiting on this key
        if Arc::strong_count(&self.lock) == 2 {
            in_flight.remove(self.key);
        }
    }
}

impl HtmlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live entry for `key`, or run `producer` and store its output.
    ///
    /// Producer errors are returned as-is and nothing is written.
    pub fn get_or_fetch<E, F>(&self, key: &str, ttl: Duration, producer: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        if let Some(html) = self.read(key) {
            tracing::debug!(key, "cache hit");
            return Ok(html);
        }

        let in_flight = self.key_lock(key);
        let _guard = in_flight.lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have filled the entry while we waited
        if let Some(html) = self.read(key) {
            tracing::debug!(key, "cache hit after wait");
            return Ok(html);
        }

        tracing::debug!(key, "cache miss");
        let html = producer()?;
        self.insert(key, html.clone(), ttl);
        Ok(html)
    }

    /// Live entry for `key`, if any
    pub fn read(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|cached| cached.is_live())
            .map(|cached| cached.html.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).is_some_and(CachedHtml::is_live)
    }

    /// Drop a single entry; returns whether a live one was present
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).is_some_and(|cached| cached.is_live())
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cached| cached.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: &str, html: String, ttl: Duration) {
        let cached = CachedHtml {
            html,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), cached);
    }

    fn key_lock<'a>(&'a self, key: &'a str) -> InFlight<'a> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        InFlight {
            cache: self,
            key,
            lock,
        }
    }
}
