//! Cache Middleware Module
//!
//! The interception stage between a route handler and its caller: derive a
//! key from the request identity, short-circuit on a cache hit, otherwise
//! run the handler and persist its response when (and only when) it
//! succeeded.
//!
//! Attach it with axum's `from_fn_with_state`:
//!
//! ```ignore
//! let cache = Arc::new(ResponseCache::new(CacheConfig::default())?);
//! let public = CacheContext::new(&cache, "public", KeyStrategy::Shared)?;
//!
//! Router::new()
//!     .route("/items", get(list_items))
//!     .layer(middleware::from_fn_with_state(public, cache_response));
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::cache::{CacheNamespace, CachedResponse, ResponseCache};
use crate::error::Result;
use crate::key::{KeyStrategy, RequestIdentity};

/// Response header marking whether the cache answered the request.
pub const CACHE_MARKER_HEADER: &str = "x-cache";

// == Cache Context ==
/// Per-route middleware state: the target namespace, the key strategy and
/// an optional TTL override.
///
/// Constructed once at router build time; resolving the namespace up front
/// means a typo fails at startup rather than degrading every request.
#[derive(Debug, Clone)]
pub struct CacheContext {
    namespace: Arc<CacheNamespace>,
    key_strategy: KeyStrategy,
    ttl: Option<Duration>,
}

impl CacheContext {
    // == Constructor ==
    /// Binds a middleware context to a configured namespace.
    pub fn new(cache: &ResponseCache, namespace: &str, key_strategy: KeyStrategy) -> Result<Self> {
        Ok(Self {
            namespace: cache.namespace(namespace)?,
            key_strategy,
            ttl: None,
        })
    }

    // == TTL Override ==
    /// Overrides the namespace default TTL for responses cached through
    /// this context.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Name of the bound namespace.
    pub fn namespace_name(&self) -> &str {
        self.namespace.name()
    }
}

// == Middleware ==
/// Caching middleware around a downstream handler.
///
/// On a hit the stored payload is replayed and the handler never runs. On a
/// miss the handler runs with no cache guard held; its response is buffered
/// and persisted only when the status is a success (2xx). Non-success
/// responses pass through untouched and are never cached, and a handler
/// panic propagates without any store write.
pub async fn cache_response(
    State(ctx): State<CacheContext>,
    request: Request,
    next: Next,
) -> Response {
    let identity = RequestIdentity::from_request(&request);
    let key = ctx.key_strategy.key_for(&identity);

    if let Some(cached) = ctx.namespace.get(&key).await {
        debug!(namespace = ctx.namespace_name(), key = %key, "cache hit");
        return marked(cached.into_response(), "HIT");
    }
    debug!(namespace = ctx.namespace_name(), key = %key, "cache miss");

    let response = next.run(request).await;

    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            // The body stream failed mid-read and is already consumed;
            // nothing is cached and the caller gets a 500.
            error!(
                namespace = ctx.namespace_name(),
                key = %key,
                error = %err,
                "failed to buffer response body"
            );
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let payload = CachedResponse::new(
        parts.status,
        parts.headers.get(header::CONTENT_TYPE).cloned(),
        bytes.clone(),
    );
    ctx.namespace.insert(key, payload, ctx.ttl).await;

    marked(Response::from_parts(parts, Body::from(bytes)), "MISS")
}

fn marked(mut response: Response, outcome: &'static str) -> Response {
    response
        .headers_mut()
        .insert(CACHE_MARKER_HEADER, HeaderValue::from_static(outcome));
    response
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, NamespaceConfig};
    use crate::error::CacheError;

    fn test_cache() -> ResponseCache {
        ResponseCache::new(CacheConfig::new(vec![NamespaceConfig::new("public", 300, 60)]))
            .unwrap()
    }

    #[test]
    fn test_context_binds_to_configured_namespace() {
        let cache = test_cache();
        let ctx = CacheContext::new(&cache, "public", KeyStrategy::Shared).unwrap();
        assert_eq!(ctx.namespace_name(), "public");
    }

    #[test]
    fn test_context_rejects_unknown_namespace() {
        let cache = test_cache();
        let result = CacheContext::new(&cache, "missing", KeyStrategy::Shared);
        assert!(matches!(result, Err(CacheError::UnknownNamespace(_))));
    }

    #[test]
    fn test_context_ttl_override() {
        let cache = test_cache();
        let ctx = CacheContext::new(&cache, "public", KeyStrategy::Shared)
            .unwrap()
            .with_ttl(Duration::from_secs(30));
        assert_eq!(ctx.ttl, Some(Duration::from_secs(30)));
    }
}
