//! TTL Sweep Task
//!
//! Background tasks that periodically remove expired cache entries so
//! steady-state memory stays bounded. Read-path correctness never depends
//! on sweep timing; expired entries are also dropped lazily on `get`.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheNamespace, ResponseCache};

/// Spawns one sweep task per configured namespace.
///
/// Returns the task handles so the host can abort them during graceful
/// shutdown.
pub fn spawn_sweep_tasks(cache: &ResponseCache) -> Vec<JoinHandle<()>> {
    cache
        .namespaces()
        .map(|namespace| spawn_sweep_task(Arc::clone(namespace)))
        .collect()
}

/// Spawns the sweep loop for a single namespace.
///
/// The task sleeps for the namespace's sweep interval between runs and
/// takes the write guard only for the removal itself, so it never blocks
/// the request path for longer than one table operation.
pub fn spawn_sweep_task(namespace: Arc<CacheNamespace>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            namespace = namespace.name(),
            interval_secs = namespace.sweep_interval().as_secs(),
            "starting TTL sweep task"
        );

        loop {
            tokio::time::sleep(namespace.sweep_interval()).await;

            let removed = namespace.sweep().await;
            if removed > 0 {
                info!(
                    namespace = namespace.name(),
                    removed, "TTL sweep removed expired entries"
                );
            } else {
                debug!(namespace = namespace.name(), "TTL sweep found nothing expired");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedResponse;
    use crate::config::{CacheConfig, NamespaceConfig};
    use axum::http::StatusCode;
    use bytes::Bytes;
    use std::time::Duration;

    fn payload(body: &str) -> CachedResponse {
        CachedResponse::new(StatusCode::OK, None, Bytes::copy_from_slice(body.as_bytes()))
    }

    fn swept_cache() -> ResponseCache {
        // 1s sweep interval, the smallest the configuration allows
        ResponseCache::new(CacheConfig::new(vec![NamespaceConfig::new("public", 300, 1)]))
            .unwrap()
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let cache = swept_cache();
        cache
            .set(
                "public",
                "expire_soon".to_string(),
                payload("value"),
                Some(Duration::from_millis(200)),
            )
            .await
            .unwrap();

        let handles = spawn_sweep_tasks(&cache);

        // Entry expires at 200ms; sweep fires at 1s
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // keys() reads the physical table, so this proves the sweep ran
        // rather than a lazy read-path drop
        assert!(cache.keys("public").await.unwrap().is_empty());

        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let cache = swept_cache();
        cache
            .set(
                "public",
                "long_lived".to_string(),
                payload("value"),
                Some(Duration::from_secs(3600)),
            )
            .await
            .unwrap();

        let handles = spawn_sweep_tasks(&cache);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            cache.get("public", "long_lived").await,
            Some(payload("value"))
        );

        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache = swept_cache();
        let handles = spawn_sweep_tasks(&cache);
        assert_eq!(handles.len(), 1);

        for handle in &handles {
            handle.abort();
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handles[0].is_finished(), "Task should be finished after abort");
    }
}
