//! Time-bounded response cache shared by the lookup paths.
//!
//! Entries are invalidated lazily: a read that finds an entry older than the
//! TTL treats it as absent. Nothing is evicted by size.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

struct Entry<V> {
    payload: V,
    stored_at: Instant,
}

pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, fingerprint: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(fingerprint)?;
        if entry.stored_at.elapsed() < self.ttl {
            trace!(fingerprint, "cache hit");
            Some(entry.payload.clone())
        } else {
            trace!(fingerprint, "cache entry expired");
            None
        }
    }

    pub fn put(&self, fingerprint: impl Into<String>, payload: V) {
        let entry = Entry {
            payload,
            stored_at: Instant::now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint.into(), entry);
    }
}

/// Build a `domain:part:part` cache key.
pub fn fingerprint<I, S>(domain: &str, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = domain.to_string();
    for part in parts {
        key.push(':');
        key.push_str(part.as_ref());
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn put_then_get_returns_payload() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k", 42);
        assert_eq!(cache.get("k"), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        cache.put("geography:places:all", "listing");

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(cache.get("geography:places:all"), Some("listing"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("geography:places:all"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_refreshes_timestamp() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.put("k", 1);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.put("k", 2);
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_key_is_absent() {
        let cache: ResponseCache<u8> = ResponseCache::new(Duration::from_secs(10));
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn fingerprint_joins_parts() {
        assert_eq!(
            fingerprint("original", ["Psalms", "23", "1"]),
            "original:Psalms:23:1"
        );
        assert_eq!(fingerprint("geography", Vec::<String>::new()), "geography");
    }
}
