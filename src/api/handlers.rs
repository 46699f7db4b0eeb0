//! API Handlers
//!
//! HTTP request handlers for the catalog and order endpoints.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::ResponseCache;
use crate::catalog::{Catalog, Item};
use crate::config::{Config, DEFAULT_MAX_INGEST_BYTES};
use crate::error::{ApiError, Result};
use crate::models::{
    CacheStatsResponse, HealthResponse, IngestRequest, ItemsResponse, OrderResponse,
    OrdersQuery, OrdersResponse, StatusResponse,
};
use crate::orders::OrderStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-only item catalog
    pub catalog: Arc<Catalog>,
    /// Orders database handle
    pub orders: OrderStore,
    /// Response cache shared by the cached routes
    pub cache: Arc<RwLock<ResponseCache>>,
    /// TTL in seconds for cached catalog responses
    pub catalog_cache_ttl: u64,
    /// Body size limit of the ingest route
    pub max_ingest_bytes: usize,
}

impl AppState {
    /// Creates a new AppState owning a fresh cache.
    pub fn new(catalog: Catalog, orders: OrderStore, cache: ResponseCache) -> Self {
        Self::with_shared_cache(catalog, orders, Arc::new(RwLock::new(cache)))
    }

    /// Creates a new AppState around an existing cache handle.
    pub fn with_shared_cache(
        catalog: Catalog,
        orders: OrderStore,
        cache: Arc<RwLock<ResponseCache>>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            orders,
            cache,
            catalog_cache_ttl: 0,
            max_ingest_bytes: DEFAULT_MAX_INGEST_BYTES,
        }
    }

    /// Creates a new AppState from configuration and already loaded resources.
    pub fn from_config(config: &Config, catalog: Catalog, orders: OrderStore) -> Self {
        Self::new(catalog, orders, ResponseCache::new())
            .with_catalog_cache_ttl(config.catalog_cache_ttl)
            .with_max_ingest_bytes(config.max_ingest_bytes)
    }

    pub fn with_catalog_cache_ttl(mut self, ttl_seconds: u64) -> Self {
        self.catalog_cache_ttl = ttl_seconds;
        self
    }

    pub fn with_max_ingest_bytes(mut self, limit: usize) -> Self {
        self.max_ingest_bytes = limit;
        self
    }
}

/// Handler for GET /items
///
/// Returns the full catalog.
pub async fn list_items_handler(State(state): State<AppState>) -> Response {
    Json(ItemsResponse {
        items: state.catalog.all_items(),
    })
    .into_response()
}

/// Handler for GET /items/:name
///
/// Returns the item whose `uniquename` matches exactly. A name that does
/// not decode as UTF-8 cannot match and is a 404.
pub async fn get_item_handler(
    State(state): State<AppState>,
    name: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<Item>> {
    let Path(name) = name?;
    state
        .catalog
        .find_by_unique_name(&name)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Handler for GET /orders
///
/// Lists orders, optionally filtered by item type via `?name=`. When `name`
/// is repeated the first value wins.
pub async fn list_orders_handler(
    State(state): State<AppState>,
    pairs: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<OrdersResponse>> {
    let Query(pairs) = pairs?;
    let query = OrdersQuery::from_pairs(pairs);
    let store = state.orders.clone();
    let orders =
        tokio::task::spawn_blocking(move || store.list_orders(query.name.as_deref())).await??;

    Ok(Json(OrdersResponse { orders }))
}

/// Handler for GET /orders/:id
///
/// Ids that are not integers are treated as unknown routes.
pub async fn get_order_handler(
    State(state): State<AppState>,
    id: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<OrderResponse>> {
    let Path(id) = id?;
    let id: i64 = id.parse().map_err(|_| ApiError::NotFound)?;
    let store = state.orders.clone();
    let order = tokio::task::spawn_blocking(move || store.get_order(id))
        .await??
        .ok_or(ApiError::NotFound)?;

    debug!("Order {} found", id);
    Ok(Json(OrderResponse { order }))
}

/// Handler for POST /marketorders.ingest
///
/// Checks the `{"Orders": [...]}` envelope, then hands the records to the
/// order store, which validates each one as it inserts it inside a single
/// transaction. Bodies over the route's limit are a 413.
pub async fn ingest_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<StatusResponse>> {
    let body = body?;
    let request = IngestRequest::from_body(&body)?;
    let store = state.orders.clone();
    tokio::task::spawn_blocking(move || store.ingest_batch(request.orders)).await??;

    Ok(Json(StatusResponse::ok()))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let cache = state.cache.read().await;
    Json(cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback for unmatched routes.
pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
