//! Market API - item catalog and market order HTTP service
//!
//! Serves a static item catalog with cached reads, and a SQLite-backed
//! market order table with transactional bulk ingest.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod orders;
pub mod tasks;

pub use api::{create_router, AppState};
pub use catalog::Catalog;
pub use config::Config;
pub use orders::OrderStore;
pub use tasks::spawn_cleanup_task;
