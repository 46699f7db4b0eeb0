//! Response Caching Middleware
//!
//! Memoizes successful handler output in the shared [`ResponseCache`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::ApiError;

/// Derives a cache key from a request URI.
pub type KeyFn = fn(&Uri) -> String;

/// Default key: `view/` followed by the request path.
///
/// The query string is not part of the key, so `/orders?name=A` and
/// `/orders?name=B` would share one entry if this policy were ever applied
/// to a route that filters on query parameters.
pub fn path_key(uri: &Uri) -> String {
    format!("view/{}", uri.path())
}

// == Cache Policy ==
/// Configuration for one cached route group.
#[derive(Clone)]
pub struct CachePolicy {
    cache: Arc<RwLock<ResponseCache>>,
    ttl_seconds: u64,
    key_fn: KeyFn,
}

impl CachePolicy {
    /// Caches into `cache` for `ttl_seconds` (0 = until overwritten or restart).
    pub fn new(cache: Arc<RwLock<ResponseCache>>, ttl_seconds: u64) -> Self {
        Self {
            cache,
            ttl_seconds,
            key_fn: path_key,
        }
    }

    pub fn with_key(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }
}

/// Middleware answering from the cache when it can.
///
/// On a miss the wrapped handler runs; a `200 OK` body is stored under the
/// derived key and returned unchanged. Any other status passes through
/// without being cached.
pub async fn cached_response(
    State(policy): State<CachePolicy>,
    request: Request,
    next: Next,
) -> Response {
    let key = (policy.key_fn)(request.uri());

    let cached = policy.cache.write().await.get(&key);
    if let Some(body) = cached {
        debug!("Cache hit for {}", key);
        return json_body(body);
    }
    debug!("Cache miss for {}", key);

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return ApiError::Internal(format!("failed to buffer response: {}", err))
                .into_response()
        }
    };

    match std::str::from_utf8(&bytes) {
        Ok(text) => policy
            .cache
            .write()
            .await
            .set(key, text, policy.ttl_seconds),
        Err(_) => warn!("Not caching non UTF-8 response for {}", key),
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn json_body(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
