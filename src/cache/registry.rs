//! Cache Registry Module
//!
//! The concurrent front over the namespace stores: one lock per namespace,
//! plus the registry that owns the fixed namespace set for the process
//! lifetime.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::warn;

use crate::cache::{CachedResponse, NamespaceStats, NamespaceStore, StatsReport};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache Namespace ==
/// One isolated cache partition with its own entry table and guard.
///
/// The lock is held only for the duration of a single table operation,
/// never across a downstream handler invocation.
#[derive(Debug)]
pub struct CacheNamespace {
    /// Namespace name
    name: String,
    /// Background sweep period for this namespace
    sweep_interval: Duration,
    /// Guarded entry table
    store: RwLock<NamespaceStore>,
}

impl CacheNamespace {
    fn new(name: String, default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            name,
            sweep_interval,
            store: RwLock::new(NamespaceStore::new(default_ttl)),
        }
    }

    /// Namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Background sweep period for this namespace.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Retrieves the payload for a key, or `None` on a miss.
    ///
    /// Takes the write guard: a read may drop an expired entry and always
    /// updates the hit/miss counters.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        self.store.write().await.get(key)
    }

    /// Stores a payload, replacing any prior entry for the key.
    ///
    /// `ttl` defaults to the namespace TTL.
    pub async fn insert(&self, key: String, payload: CachedResponse, ttl: Option<Duration>) {
        self.store.write().await.set(key, payload, ttl);
    }

    /// Removes a key; absent keys are a no-op. Returns whether an entry
    /// was removed.
    pub async fn remove(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Snapshot of currently stored keys (may include unswept expired keys).
    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys()
    }

    /// Removes all entries, returning the prior size.
    pub async fn clear(&self) -> usize {
        self.store.write().await.clear()
    }

    /// Removes every key starting with `prefix`, returning the count.
    pub async fn remove_prefix(&self, prefix: &str) -> usize {
        self.store.write().await.remove_prefix(prefix)
    }

    /// Removes expired entries, returning the count. Called by the
    /// background sweeper.
    pub async fn sweep(&self) -> usize {
        self.store.write().await.sweep_expired()
    }

    /// Current counters for this namespace.
    pub async fn stats(&self) -> NamespaceStats {
        self.store.read().await.stats()
    }

    /// Number of physically stored entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

// == Response Cache ==
/// The set of cache namespaces for one process.
///
/// Built once at startup from validated configuration and shared by
/// reference wherever caching is needed; there is no global instance.
#[derive(Debug)]
pub struct ResponseCache {
    namespaces: HashMap<String, Arc<CacheNamespace>>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates the cache from configuration.
    ///
    /// Fails fast on invalid configuration, before any namespace is usable.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let namespaces = config
            .namespaces
            .iter()
            .map(|ns| {
                (
                    ns.name.clone(),
                    Arc::new(CacheNamespace::new(
                        ns.name.clone(),
                        ns.ttl(),
                        ns.sweep_interval(),
                    )),
                )
            })
            .collect();

        Ok(Self { namespaces })
    }

    // == Namespace Lookup ==
    /// Resolves a namespace by name.
    pub fn namespace(&self, name: &str) -> Result<Arc<CacheNamespace>> {
        self.namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::UnknownNamespace(name.to_string()))
    }

    /// All configured namespaces.
    pub fn namespaces(&self) -> impl Iterator<Item = &Arc<CacheNamespace>> {
        self.namespaces.values()
    }

    // == Get ==
    /// Retrieves the payload for a key, or `None` on a miss.
    ///
    /// Never fails: a lookup against an unknown namespace degrades to a
    /// miss with a warning instead of failing the request path.
    pub async fn get(&self, namespace: &str, key: &str) -> Option<CachedResponse> {
        match self.namespaces.get(namespace) {
            Some(ns) => ns.get(key).await,
            None => {
                warn!(namespace, "lookup against unknown namespace treated as miss");
                None
            }
        }
    }

    // == Set ==
    /// Stores a payload under a key with overwrite semantics.
    pub async fn set(
        &self,
        namespace: &str,
        key: String,
        payload: CachedResponse,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.namespace(namespace)?.insert(key, payload, ttl).await;
        Ok(())
    }

    // == Delete ==
    /// Removes a key; deleting an absent key is a no-op.
    pub async fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        Ok(self.namespace(namespace)?.remove(key).await)
    }

    // == Keys ==
    /// Snapshot of a namespace's currently stored keys.
    pub async fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        Ok(self.namespace(namespace)?.keys().await)
    }

    // == Clear ==
    /// Removes all entries in a namespace, returning the prior size.
    pub async fn clear(&self, namespace: &str) -> Result<usize> {
        Ok(self.namespace(namespace)?.clear().await)
    }

    // == Stats ==
    /// Snapshot of every namespace's counters.
    pub async fn stats(&self) -> StatsReport {
        let mut namespaces = BTreeMap::new();
        for ns in self.namespaces.values() {
            namespaces.insert(ns.name().to_string(), ns.stats().await);
        }
        StatsReport::new(namespaces)
    }
}
