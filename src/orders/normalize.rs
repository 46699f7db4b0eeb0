//! Order Normalization Module
//!
//! Validates raw ingest records and converts prices to whole-unit currency.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::{ApiError, Result};

/// Raw price field supplied by the upstream feed.
pub const PRICE_FIELD: &str = "UnitPriceSilver";

/// Upstream prices are expressed in 1/10000 of a silver.
pub const PRICE_SCALE: f64 = 10_000.0;

/// A record ready to be inserted, keyed by column name.
pub type NormalizedOrder = Map<String, Value>;

// == Normalize Order ==
/// Checks one raw record and rescales its price.
///
/// `index` is the record's position in the batch and only feeds error messages.
/// Rejects records that are not objects, lack a numeric price, use a field
/// name that is not a plain SQL identifier, repeat a field under a different
/// letter case, or carry nested values.
pub fn normalize_order(index: usize, raw: Value) -> Result<NormalizedOrder> {
    let Value::Object(mut order) = raw else {
        return Err(ApiError::BadRequest(format!(
            "order {} is not a JSON object",
            index
        )));
    };

    let price = order
        .get(PRICE_FIELD)
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "order {} has no numeric {}",
                index, PRICE_FIELD
            ))
        })?;
    let scaled = Number::from_f64(price / PRICE_SCALE).ok_or_else(|| {
        ApiError::BadRequest(format!("order {} has an invalid {}", index, PRICE_FIELD))
    })?;
    order.insert(PRICE_FIELD.to_string(), Value::Number(scaled));

    // SQLite column names are case-insensitive
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(order.len());
    for (field, value) in &order {
        if !is_identifier(field) {
            return Err(ApiError::BadRequest(format!(
                "order {} has invalid field name {:?}",
                index, field
            )));
        }
        if let Some(previous) = seen.insert(field.to_ascii_lowercase(), field) {
            return Err(ApiError::BadRequest(format!(
                "order {} fields {} and {} name the same column",
                index, previous, field
            )));
        }
        if value.is_array() || value.is_object() {
            return Err(ApiError::BadRequest(format!(
                "order {} field {} must be a scalar",
                index, field
            )));
        }
    }

    Ok(order)
}

/// Plain ASCII identifier: letters, digits and underscores, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
