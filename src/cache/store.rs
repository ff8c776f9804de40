//! Namespace Store Module
//!
//! The synchronous entry table for one namespace: HashMap storage with TTL
//! expiration, prefix removal and hit/miss accounting. Concurrency is layered
//! on top by the registry, which wraps each store in its own lock.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CachedResponse, NamespaceStats, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

// == Namespace Store ==
/// Entry table for a single cache namespace.
///
/// Expiration is dual: `sweep_expired` runs periodically from a background
/// task to bound memory, and independently every `get` treats an
/// expired-but-unswept entry as absent and removes it on the spot.
#[derive(Debug)]
pub struct NamespaceStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Hit/miss counters
    stats: NamespaceStats,
    /// TTL applied when `set` is called without an explicit one
    default_ttl: Duration,
}

impl NamespaceStore {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: NamespaceStats::new(),
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves the payload for a key, or `None` on a miss.
    ///
    /// Never fails: an absent or expired key is a miss. Expired entries are
    /// removed opportunistically so the read path stays correct regardless
    /// of sweep timing.
    pub fn get(&mut self, key: &str) -> Option<CachedResponse> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.stats.record_miss();
                debug!(key, "expired entry dropped on read");
                None
            }
            Some(entry) => {
                let payload = entry.payload.clone();
                self.stats.record_hit();
                Some(payload)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a payload under a key, replacing any prior entry wholesale.
    ///
    /// `ttl` defaults to the namespace TTL. Oversized keys or bodies are
    /// skipped rather than stored; the cache is an optimization and must
    /// never turn one request's payload into another request's failure.
    pub fn set(&mut self, key: String, payload: CachedResponse, ttl: Option<Duration>) {
        if key.len() > MAX_KEY_LENGTH {
            debug!(key_len = key.len(), "key exceeds limit, not cached");
            return;
        }
        if payload.body_len() > MAX_VALUE_SIZE {
            debug!(key = %key, body_len = payload.body_len(), "body exceeds limit, not cached");
            return;
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(payload, ttl));
    }

    // == Delete ==
    /// Removes a key. Returns whether an entry was present; deleting an
    /// absent key is a no-op.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Keys ==
    /// Snapshot of currently stored keys.
    ///
    /// May include logically expired keys that have not been swept yet.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Clear ==
    /// Removes all entries, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Remove Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        let count = matching.len();
        for key in matching {
            self.entries.remove(&key);
        }
        count
    }

    // == Sweep Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.entries.remove(&key);
        }
        count
    }

    // == Stats ==
    /// Current counters with the key count filled in.
    pub fn stats(&self) -> NamespaceStats {
        let mut stats = self.stats.clone();
        stats.set_key_count(self.entries.len());
        stats
    }

    // == Length ==
    /// Number of physically stored entries (expired or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
