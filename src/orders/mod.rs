//! Orders Module
//!
//! Market order persistence: price normalization and the SQLite-backed store.

mod normalize;
mod store;

pub use normalize::{is_identifier, normalize_order, NormalizedOrder, PRICE_FIELD, PRICE_SCALE};
pub use store::{Order, OrderStore, ITEM_TYPE_COLUMN};

/// Schema shipped with the crate, used when no schema file is configured.
pub const DEFAULT_SCHEMA: &str = include_str!("../../schema.sql");
