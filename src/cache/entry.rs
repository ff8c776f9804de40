//! Cache Entry Module
//!
//! Defines the cached payload and its TTL-stamped envelope.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;

// == Cached Response ==
/// The payload stored for a cache key: enough of an HTTP response to replay
/// it to a later caller without re-invoking the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    /// Status the handler originally returned
    pub status: StatusCode,
    /// Content-Type header of the original response, if any
    pub content_type: Option<HeaderValue>,
    /// Buffered response body
    pub body: Bytes,
}

impl CachedResponse {
    // == Constructor ==
    /// Creates a cached response from raw parts.
    pub fn new(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    // == JSON Constructor ==
    /// Creates a `200 OK` JSON payload from any serializable value.
    ///
    /// Convenience for collaborators that populate the cache explicitly
    /// rather than through the middleware.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(Self {
            status: StatusCode::OK,
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from(body),
        })
    }

    /// Size of the buffered body in bytes.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

// == Cache Entry ==
/// A stored payload plus its expiry metadata.
///
/// Entries are immutable once inserted; an overwrite replaces the whole
/// entry, including its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub payload: CachedResponse,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    pub fn new(payload: CachedResponse, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let expires_at = now.saturating_add(ttl.as_millis() as u64);

        Self {
            payload,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry's TTL has elapsed.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `expires_at`, so a key is visible to `get`
    /// if and only if `now < expires_at`.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining TTL in milliseconds; `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
