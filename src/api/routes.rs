//! API Routes
//!
//! Configures the Axum router with all market API endpoints.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::cached::{cached_response, CachePolicy};
use super::handlers::{
    cache_stats_handler, get_item_handler, get_order_handler, health_handler, ingest_handler,
    list_items_handler, list_orders_handler, not_found_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /items` - Full catalog (cached)
/// - `GET /items/:name` - One catalog item (cached)
/// - `GET /orders` - Orders, optionally filtered with `?name=`
/// - `GET /orders/:id` - One order
/// - `POST /marketorders.ingest` - Bulk order ingest, body capped at
///   `AppState::max_ingest_bytes`
/// - `GET /cache/stats` - Response cache statistics
/// - `GET /health` - Health check endpoint
///
/// Anything else answers `404 {"error": "Not found"}`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog_cache = CachePolicy::new(state.cache.clone(), state.catalog_cache_ttl);
    let catalog_routes = Router::new()
        .route("/items", get(list_items_handler))
        .route("/items/:name", get(get_item_handler))
        .route_layer(from_fn_with_state(catalog_cache, cached_response));

    Router::new()
        .merge(catalog_routes)
        .route("/orders", get(list_orders_handler))
        .route("/orders/:id", get(get_order_handler))
        .route(
            "/marketorders.ingest",
            post(ingest_handler).layer(DefaultBodyLimit::max(state.max_ingest_bytes)),
        )
        .route("/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
