//! Response cache demo server
//!
//! A minimal host application showing how collaborators wire the cache:
//! namespaced middleware around route handlers, invalidation after
//! mutations, background sweepers and a stats endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    middleware,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use response_cache::{
    cache_response, spawn_sweep_tasks, ActorId, CacheConfig, CacheContext, CacheError,
    InvalidationManager, KeyStrategy, ResponseCache,
};

/// Shared state for the demo handlers.
#[derive(Clone)]
struct AppState {
    cache: Arc<ResponseCache>,
    invalidation: InvalidationManager,
}

/// Main entry point for the demo server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Build the response cache from configuration (fails fast if invalid)
/// 3. Start one background sweep task per namespace
/// 4. Create the router with cached and mutating routes
/// 5. Start the HTTP server
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "response_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting response cache demo server");

    let cache = Arc::new(
        ResponseCache::new(CacheConfig::default()).context("invalid cache configuration")?,
    );
    let invalidation = InvalidationManager::new(Arc::clone(&cache));
    info!("Cache namespaces initialized");

    let sweep_handles = spawn_sweep_tasks(&cache);
    info!("Background sweep tasks started");

    // One middleware context per cached route group
    let public = CacheContext::new(&cache, "public", KeyStrategy::Shared)?;
    let user = CacheContext::new(&cache, "user", KeyStrategy::PerActor)?;

    let state = AppState {
        cache,
        invalidation,
    };

    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route(
            "/items",
            get(list_items).layer(middleware::from_fn_with_state(public, cache_response)),
        )
        .route(
            "/profile",
            get(get_profile).layer(middleware::from_fn_with_state(user, cache_response)),
        )
        .route("/profile/update", post(update_profile))
        .route("/cache/stats", get(stats_handler))
        .layer(middleware::from_fn(tag_actor))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind server port")?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handles))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Stands in for the external auth layer: tags requests carrying an
/// `x-actor-id` header with an [`ActorId`] extension. Requests without the
/// header stay anonymous.
async fn tag_actor(
    mut request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    let actor = request
        .headers()
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if let Some(actor) = actor {
        request.extensions_mut().insert(ActorId::new(actor));
    }
    next.run(request).await
}

/// Demo public route; the freshness timestamp makes cache hits visible.
async fn list_items() -> Json<Value> {
    Json(json!({
        "items": ["alpha", "beta", "gamma"],
        "generated_at": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Demo user-scoped route.
async fn get_profile(actor: Option<Extension<ActorId>>) -> Json<Value> {
    let actor = actor.map(|Extension(a)| a.0).unwrap_or_else(|| "anonymous".to_string());
    Json(json!({
        "actor": actor,
        "generated_at": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Demo mutating route: drops the acting user's cached responses so the
/// next read repopulates them with fresh data.
async fn update_profile(
    State(state): State<AppState>,
    actor: Option<Extension<ActorId>>,
) -> Result<Json<Value>, CacheError> {
    let actor = actor.map(|Extension(a)| a.0).unwrap_or_else(|| "anonymous".to_string());
    let removed = state.invalidation.invalidate_actor("user", &actor).await?;
    Ok(Json(json!({
        "actor": actor,
        "invalidated": removed,
    })))
}

/// Observability endpoint over the per-namespace counters.
async fn stats_handler(State(state): State<AppState>) -> Json<Value> {
    let report = state.cache.stats().await;
    Json(serde_json::to_value(report).unwrap_or_else(|_| json!({})))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep tasks and allows graceful shutdown.
async fn shutdown_signal(sweep_handles: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in sweep_handles {
        handle.abort();
    }
    warn!("Sweep tasks aborted");
}
