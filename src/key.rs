//! Key Generation Module
//!
//! Deterministic mapping from a request's identity to a cache key string.
//! The key must carry enough of the identity to keep logically distinct
//! requests apart, in particular the acting user for user-scoped namespaces.

use std::fmt;
use std::sync::Arc;

use axum::http::{Method, Request};

/// Actor token used when no authenticated actor is attached to a request.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

// == Actor Id ==
/// Stable per-actor identifier, inserted into request extensions by the
/// authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

// == Request Identity ==
/// The parts of a request that participate in key derivation.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    /// HTTP method
    pub method: Method,
    /// Path plus query string, as received
    pub path_and_query: String,
    /// Acting user, if the auth layer identified one
    pub actor: Option<String>,
}

impl RequestIdentity {
    /// Creates an identity from explicit parts.
    pub fn new(method: Method, path_and_query: impl Into<String>, actor: Option<String>) -> Self {
        Self {
            method,
            path_and_query: path_and_query.into(),
            actor,
        }
    }

    /// Extracts the identity from a request.
    ///
    /// The actor comes from the [`ActorId`] extension when the auth layer
    /// has attached one.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        let actor = request
            .extensions()
            .get::<ActorId>()
            .map(|actor| actor.0.clone());

        Self {
            method: request.method().clone(),
            path_and_query,
            actor,
        }
    }

    /// The actor identifier, falling back to the anonymous token.
    pub fn actor_or_anonymous(&self) -> &str {
        self.actor.as_deref().unwrap_or(ANONYMOUS_ACTOR)
    }
}

// == Key Strategy ==
/// How a namespace derives cache keys from request identity.
#[derive(Clone)]
pub enum KeyStrategy {
    /// One entry per method + path + query, shared by all callers
    Shared,
    /// One entry per actor per method + path + query; the actor prefix keeps
    /// a user's entries contiguous for prefix invalidation
    PerActor,
    /// Caller-supplied derivation
    Custom(Arc<dyn Fn(&RequestIdentity) -> String + Send + Sync>),
}

impl KeyStrategy {
    /// Wraps a closure as a custom strategy.
    pub fn custom<F>(generator: F) -> Self
    where
        F: Fn(&RequestIdentity) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(generator))
    }

    /// Derives the cache key for a request.
    ///
    /// Deterministic: identical identities always produce identical keys.
    pub fn key_for(&self, identity: &RequestIdentity) -> String {
        match self {
            Self::Shared => format!("{}_{}", identity.method, identity.path_and_query),
            Self::PerActor => format!(
                "{}_{}_{}",
                identity.actor_or_anonymous(),
                identity.method,
                identity.path_and_query
            ),
            Self::Custom(generator) => generator(identity),
        }
    }

    /// Key prefix covering every entry a [`KeyStrategy::PerActor`] namespace
    /// holds for one actor. The trailing separator keeps actor `4` from
    /// matching actor `42`.
    pub fn actor_prefix(actor: &str) -> String {
        format!("{actor}_")
    }
}

impl fmt::Debug for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "KeyStrategy::Shared"),
            Self::PerActor => write!(f, "KeyStrategy::PerActor"),
            Self::Custom(_) => write!(f, "KeyStrategy::Custom(..)"),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn request_for(method: Method, uri: &str, actor: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.extension(ActorId::new(actor));
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_shared_key_is_deterministic() {
        let strategy = KeyStrategy::Shared;
        let identity = RequestIdentity::new(Method::GET, "/items?page=2", None);

        assert_eq!(strategy.key_for(&identity), "GET_/items?page=2");
        assert_eq!(strategy.key_for(&identity), strategy.key_for(&identity));
    }

    #[test]
    fn test_distinct_requests_get_distinct_keys() {
        let strategy = KeyStrategy::Shared;
        let get = RequestIdentity::new(Method::GET, "/items", None);
        let post = RequestIdentity::new(Method::POST, "/items", None);
        let other_path = RequestIdentity::new(Method::GET, "/items?page=2", None);

        assert_ne!(strategy.key_for(&get), strategy.key_for(&post));
        assert_ne!(strategy.key_for(&get), strategy.key_for(&other_path));
    }

    #[test]
    fn test_per_actor_key_includes_actor() {
        let strategy = KeyStrategy::PerActor;
        let alice = RequestIdentity::new(Method::GET, "/profile", Some("42".to_string()));
        let bob = RequestIdentity::new(Method::GET, "/profile", Some("7".to_string()));

        assert_eq!(strategy.key_for(&alice), "42_GET_/profile");
        assert_ne!(strategy.key_for(&alice), strategy.key_for(&bob));
    }

    #[test]
    fn test_per_actor_anonymous_fallback() {
        let strategy = KeyStrategy::PerActor;
        let identity = RequestIdentity::new(Method::GET, "/profile", None);

        assert_eq!(strategy.key_for(&identity), "anonymous_GET_/profile");
    }

    #[test]
    fn test_actor_prefix_covers_actor_keys_only() {
        let strategy = KeyStrategy::PerActor;
        let actor_42 = RequestIdentity::new(Method::GET, "/profile", Some("42".to_string()));
        let actor_4 = RequestIdentity::new(Method::GET, "/profile", Some("4".to_string()));

        let prefix = KeyStrategy::actor_prefix("4");
        assert!(strategy.key_for(&actor_4).starts_with(&prefix));
        assert!(!strategy.key_for(&actor_42).starts_with(&prefix));
    }

    #[test]
    fn test_custom_strategy() {
        let strategy = KeyStrategy::custom(|identity| format!("v2:{}", identity.path_and_query));
        let identity = RequestIdentity::new(Method::GET, "/items", None);

        assert_eq!(strategy.key_for(&identity), "v2:/items");
    }

    #[test]
    fn test_identity_from_request() {
        let request = request_for(Method::GET, "/items?sort=name", Some("42"));
        let identity = RequestIdentity::from_request(&request);

        assert_eq!(identity.method, Method::GET);
        assert_eq!(identity.path_and_query, "/items?sort=name");
        assert_eq!(identity.actor.as_deref(), Some("42"));
    }

    #[test]
    fn test_identity_from_request_without_actor() {
        let request = request_for(Method::GET, "/items", None);
        let identity = RequestIdentity::from_request(&request);

        assert!(identity.actor.is_none());
        assert_eq!(identity.actor_or_anonymous(), ANONYMOUS_ACTOR);
    }
}
