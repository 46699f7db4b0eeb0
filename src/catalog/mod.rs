//! Catalog Module
//!
//! Read-only collection of game items loaded once at startup.

mod item;
mod loader;

pub use item::{Item, ItemType, UNIQUE_NAME_FIELD};
pub use loader::Catalog;
