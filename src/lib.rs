//! Response Cache - an in-process HTTP response caching layer
//!
//! Provides namespaced, TTL-bounded response stores with middleware
//! interception, prefix invalidation and per-namespace statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod key;
pub mod middleware;
pub mod tasks;

pub use cache::{CacheNamespace, CachedResponse, NamespaceStats, ResponseCache, StatsReport};
pub use config::{CacheConfig, NamespaceConfig};
pub use error::CacheError;
pub use invalidation::InvalidationManager;
pub use key::{ActorId, KeyStrategy, RequestIdentity};
pub use middleware::{cache_response, CacheContext, CACHE_MARKER_HEADER};
pub use tasks::spawn_sweep_tasks;
