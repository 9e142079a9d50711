use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

/// Default entry lifetime. Dashboard data changes slowly enough that five
/// minutes saves most duplicate calls within one viewing session.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// In-memory key-value cache with per-entry TTL.
///
/// Entries expire lazily: `get` and `has` purge an expired entry when they
/// touch it. There is no sliding expiration - reads never extend a
/// lifetime. Per-key check/purge/write runs under one lock, so concurrent
/// misses for the same key at worst double-fetch and the last write wins.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Store `value` under `key` with the default TTL, overwriting any
    /// existing entry.
    pub fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Fetch the value stored under `key`, or `None` when nothing fresh is
    /// there. An expired entry is removed on the way out.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "purging expired cache entry");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Same expiry check and purge as `get`, without cloning the value.
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Drop every entry, e.g. on logout.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn backdate(cache: &ResponseCache, key: &str, by: Duration) {
        let mut entries = cache.lock();
        let entry = entries.get_mut(key).expect("entry to backdate");
        entry.stored_at -= by;
    }

    #[test]
    fn set_then_get_round_trips_within_ttl() {
        let cache = ResponseCache::new();
        let value = json!({"clients": [{"id": 1, "name": "Acme"}]});
        cache.set("clients", value.clone());
        assert_eq!(cache.get("clients"), Some(value));
        assert!(cache.has("clients"));
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = ResponseCache::new();
        cache.set("k", json!(1));
        cache.set("k", json!(2));
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[test]
    fn expired_entry_is_absent_and_purged() {
        let cache = ResponseCache::new();
        cache.set("k", json!("v"));
        backdate(&cache, "k", DEFAULT_TTL + Duration::from_secs(1));

        assert_eq!(cache.get("k"), None);
        assert!(!cache.lock().contains_key("k"));
    }

    #[test]
    fn has_purges_expired_entries_too() {
        let cache = ResponseCache::new();
        cache.set("k", json!("v"));
        backdate(&cache, "k", DEFAULT_TTL + Duration::from_secs(1));

        assert!(!cache.has("k"));
        assert!(!cache.lock().contains_key("k"));
    }

    #[test]
    fn entry_near_ttl_deadline_is_still_valid() {
        let cache = ResponseCache::with_default_ttl(Duration::from_secs(60));
        cache.set("k", json!("v"));
        // one second shy of the deadline; only strictly older entries expire
        backdate(&cache, "k", Duration::from_secs(59));
        assert!(cache.has("k"));
    }

    #[test]
    fn per_entry_ttl_overrides_default() {
        let cache = ResponseCache::new();
        cache.set_with_ttl("k", json!("v"), Duration::from_secs(10));
        backdate(&cache, "k", Duration::from_secs(11));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = ResponseCache::new();
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.clear();
        assert!(!cache.has("a"));
        assert!(!cache.has("b"));
    }
}
