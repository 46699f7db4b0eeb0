//! API Module
//!
//! HTTP handlers, routing and response caching for the market API.
//!
//! # Endpoints
//! - `GET /items` - Full item catalog
//! - `GET /items/:name` - Item by unique name
//! - `GET /orders` - Market orders, optional `?name=` item type filter
//! - `GET /orders/:id` - Market order by id
//! - `POST /marketorders.ingest` - Bulk order ingest
//! - `GET /cache/stats` - Response cache statistics
//! - `GET /health` - Health check endpoint

pub mod cached;
pub mod handlers;
pub mod routes;

pub use cached::{cached_response, path_key, CachePolicy};
pub use handlers::*;
pub use routes::create_router;
