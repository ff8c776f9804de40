//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the response cache.
///
/// These errors never surface on the cached request path itself; faults
/// there degrade to a cache miss. They are returned from configuration and
/// from administrative operations (invalidation, explicit store access)
/// whose callers name namespaces directly.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Operation addressed a namespace that was not configured at startup
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Invalid cache configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::UnknownNamespace(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::InvalidConfig(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;
