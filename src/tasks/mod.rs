//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache cleanup: removes expired response cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
