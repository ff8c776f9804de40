//! Invalidation Module
//!
//! Bulk removal of cache entries, invoked out-of-band by state-mutating
//! operations so stale responses disappear before their TTL would expire.

use std::sync::Arc;

use tracing::info;

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::key::KeyStrategy;

// == Invalidation Manager ==
/// Removes entries by prefix, by actor or by whole namespace.
///
/// Cheap to clone; hand one to every component that mutates state reflected
/// in cached responses.
#[derive(Debug, Clone)]
pub struct InvalidationManager {
    cache: Arc<ResponseCache>,
}

impl InvalidationManager {
    // == Constructor ==
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }

    // == Invalidate By Prefix ==
    /// Deletes every key in the namespace beginning with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_by_prefix(&self, namespace: &str, prefix: &str) -> Result<usize> {
        let ns = self.cache.namespace(namespace)?;
        let removed = ns.remove_prefix(prefix).await;
        info!(namespace, prefix, removed, "invalidated entries by prefix");
        Ok(removed)
    }

    // == Invalidate Actor ==
    /// Deletes every entry a per-actor namespace holds for one actor.
    ///
    /// Used after a mutation to that actor's resources so the next read
    /// repopulates the cache with fresh data.
    pub async fn invalidate_actor(&self, namespace: &str, actor: &str) -> Result<usize> {
        self.invalidate_by_prefix(namespace, &KeyStrategy::actor_prefix(actor))
            .await
    }

    // == Invalidate Namespace ==
    /// Clears all entries in the namespace.
    ///
    /// Returns the prior entry count.
    pub async fn invalidate_namespace(&self, namespace: &str) -> Result<usize> {
        let ns = self.cache.namespace(namespace)?;
        let removed = ns.clear().await;
        info!(namespace, removed, "invalidated namespace");
        Ok(removed)
    }
}
