use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// A cached payload together with the instant it stops being servable.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-wide key/value store with expiration metadata.
///
/// Entries are never swept: staleness is detected by the reader via
/// `expires_at`, and a stale slot is simply overwritten by the next
/// successful fetch. Every `set` is an atomic replace of one key, so
/// last-writer-wins is the only ordering guarantee.
#[derive(Debug, Default)]
pub struct ExpiringCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ExpiringCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry without applying expiration; callers own the
    /// `expires_at` check.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    /// Store a value with `expires_at = now + ttl`, unconditionally
    /// replacing any previous entry at `key`.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Utc::now() + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    // A poisoned lock only means some writer panicked mid-insert; the map
    // itself is still a usable map, so recover it rather than propagate.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
