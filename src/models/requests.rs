//! Request DTOs for the market API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Query string of `GET /orders`
#[derive(Debug, Clone, Default)]
pub struct OrdersQuery {
    /// Optional item type filter
    pub name: Option<String>,
}

impl OrdersQuery {
    /// Builds the query from decoded key/value pairs.
    ///
    /// A repeated `name` keeps its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let name = pairs
            .into_iter()
            .find(|(key, _)| key == "name")
            .map(|(_, value)| value);
        Self { name }
    }
}

/// Request body for `POST /marketorders.ingest`
///
/// Records stay as raw JSON; the order store validates them field by field.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    #[serde(rename = "Orders")]
    pub orders: Vec<Value>,
}

impl IngestRequest {
    /// Parses a raw request body.
    ///
    /// An empty body, invalid JSON, or a document without an `Orders` array
    /// is a bad request.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::BadRequest("request body is empty".to_string()));
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("invalid ingest payload: {}", e)))
    }
}
