//! A lock-guarded, lazily-expiring TTL cache and the middleware that fronts providers with it.
//!
//! Each entry stores `{value, insert_time, ttl}` behind a mutex-guarded map.
//! Expiry is lazy: a lookup past its TTL is treated as a miss and removed on
//! the spot, with no background sweep task. Namespaces (identifier lookups,
//! XBRL bodies, company info) carry distinct TTLs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use research_core::provider::{BasketProvider, Cached};
use research_core::types::{BasketResult, Ticker};
use research_types::ResearchError;

struct Entry {
    value: serde_json::Value,
    insert_time: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.insert_time.elapsed() >= self.ttl
    }
}

/// A TTL cache keyed by string, with a single TTL applied to all entries it stores.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl TtlCache {
    /// Construct an empty cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of entries currently stored, including not-yet-swept expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opportunistically drop expired entries. Called on `set`; callers may
    /// also invoke it directly (e.g. from a periodic maintenance task).
    pub fn sweep(&self) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.retain(|_, e| !e.is_expired());
    }
}

impl Cached for TtlCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(e) if e.is_expired() => {
                entries.remove(key);
                None
            }
            Some(e) => Some(e.value.clone()),
            None => None,
        }
    }

    fn set(&self, key: &str, value: serde_json::Value) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value,
                insert_time: Instant::now(),
                ttl: self.ttl,
            },
        );
        drop(entries);
        self.sweep();
    }
}

/// Middleware that caches a provider's fetch result, keyed by ticker symbol.
pub struct CacheMiddleware {
    cache: Arc<TtlCache>,
}

impl CacheMiddleware {
    /// Construct a cache middleware with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(TtlCache::new(ttl)),
        }
    }
}

struct CachedProvider {
    inner: Arc<dyn BasketProvider>,
    cache: Arc<TtlCache>,
}

#[async_trait]
impl BasketProvider for CachedProvider {
    fn provider_id(&self) -> &'static str {
        self.inner.provider_id()
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let key = format!("{}:{}", self.inner.provider_id(), ticker.symbol);
        if let Some(cached) = self.cache.get(&key) {
            if let Ok(result) = serde_json::from_value(cached) {
                return Ok(result);
            }
        }
        let result = self.inner.fetch(ticker).await?;
        if let Ok(json) = serde_json::to_value(&result) {
            self.cache.set(&key, json);
        }
        Ok(result)
    }
}

impl research_core::middleware::Middleware for CacheMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn BasketProvider>) -> Arc<dyn BasketProvider> {
        Arc::new(CachedProvider {
            inner,
            cache: self.cache,
        })
    }

    fn name(&self) -> &'static str {
        "CacheMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({ "ttl_ms": self.cache.ttl.as_millis() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_after_ttl_elapses_returns_none() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.set("k", serde_json::json!("v"));
        assert_eq!(cache.get("k"), Some(serde_json::json!("v")));
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn sweep_on_set_drops_expired_siblings() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.set("a", serde_json::json!(1));
        std::thread::sleep(Duration::from_millis(25));
        cache.set("b", serde_json::json!(2));
        assert_eq!(cache.len(), 1);
    }
}
