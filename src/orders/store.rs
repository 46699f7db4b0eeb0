//! Order Store Module
//!
//! Access layer over the SQLite `orders` table.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::orders::normalize::{normalize_order, NormalizedOrder};

/// Column holding the item-type reference used by the `name` filter.
pub const ITEM_TYPE_COLUMN: &str = "ItemTypeId";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A persisted order, keyed by column name.
pub type Order = Map<String, Value>;

// == Order Store ==
/// Handle to the orders database.
///
/// Every operation opens its own connection and drops it before returning,
/// so a handle is cheap to clone into request handlers.
#[derive(Debug, Clone)]
pub struct OrderStore {
    path: Arc<PathBuf>,
}

impl OrderStore {
    // == Constructor ==
    /// Creates a handle for the database file at `path`.
    ///
    /// No connection is opened until the first operation.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: Arc::new(path.as_ref().to_path_buf()),
        }
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(self.path.as_path())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    // == Init Schema ==
    /// Runs the schema script against the database.
    pub fn init_schema(&self, sql: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(sql)?;
        info!("Order schema applied to {}", self.path.display());
        Ok(())
    }

    // == List Orders ==
    /// Returns every order, or only those whose item type equals `item_type`.
    ///
    /// Rows come back in whatever order SQLite yields them.
    pub fn list_orders(&self, item_type: Option<&str>) -> Result<Vec<Order>> {
        let conn = self.connect()?;
        let orders = match item_type.filter(|name| !name.is_empty()) {
            Some(name) => query_orders(
                &conn,
                &format!("SELECT * FROM orders WHERE {} = ?1", ITEM_TYPE_COLUMN),
                params![name],
            )?,
            None => query_orders(&conn, "SELECT * FROM orders", params![])?,
        };
        debug!("Listed {} orders (filter: {:?})", orders.len(), item_type);
        Ok(orders)
    }

    // == Get Order ==
    /// Looks up a single order by its store-assigned id.
    pub fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let conn = self.connect()?;
        let mut orders = query_orders(&conn, "SELECT * FROM orders WHERE id = ?1", params![id])?;
        Ok(if orders.is_empty() {
            None
        } else {
            Some(orders.swap_remove(0))
        })
    }

    // == Ingest Batch ==
    /// Normalizes and inserts a batch of raw records in one transaction.
    ///
    /// The first invalid record aborts the batch: the transaction is dropped
    /// uncommitted and the table is left as it was. Returns the number of
    /// inserted rows.
    pub fn ingest_batch(&self, raw_orders: Vec<Value>) -> Result<usize> {
        let mut conn = self.connect()?;
        let columns = table_columns(&conn)?;
        let tx = conn.transaction()?;

        let mut inserted = 0;
        for (index, raw) in raw_orders.into_iter().enumerate() {
            let order = normalize_order(index, raw)?;
            if let Some(field) = order
                .keys()
                .find(|field| !columns.contains(&field.to_ascii_lowercase()))
            {
                return Err(ApiError::BadRequest(format!(
                    "order {} has unknown field {}",
                    index, field
                )));
            }
            insert_order(&tx, &order)?;
            inserted += 1;
        }

        tx.commit()?;
        info!("Ingested {} orders", inserted);
        Ok(inserted)
    }

    // == Count ==
    /// Total number of stored orders.
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Lower-cased column names of `orders`; SQLite matches them case-insensitively.
fn table_columns(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(orders)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .map(|name| name.map(|n| n.to_ascii_lowercase()))
        .collect::<rusqlite::Result<HashSet<_>>>()?;

    if columns.is_empty() {
        return Err(ApiError::Internal("table orders does not exist".to_string()));
    }
    Ok(columns)
}

fn insert_order(conn: &Connection, order: &NormalizedOrder) -> Result<()> {
    let columns: Vec<String> = order.keys().map(|field| format!("\"{}\"", field)).collect();
    let placeholders: Vec<String> = (1..=order.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO orders ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    stmt.execute(params_from_iter(order.values().map(to_sql_value)))?;
    Ok(())
}

fn query_orders(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let orders = stmt
        .query_map(params, |row| row_to_order(row, &columns))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(orders)
}

fn row_to_order(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Order> {
    let mut order = Map::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        order.insert(column.clone(), from_sql_value(row.get_ref(index)?));
    }
    Ok(order)
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(int) => SqlValue::Integer(int),
            None => SqlValue::Real(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        // normalize_order rejects nested values before they get here
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(int) => Value::from(int),
        ValueRef::Real(real) => Number::from_f64(real).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::orders::DEFAULT_SCHEMA as SCHEMA;

    fn test_store() -> (TempDir, OrderStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(dir.path().join("orders.sqlite3"));
        store.init_schema(SCHEMA).unwrap();
        (dir, store)
    }

    fn raw_order(item: &str, price: i64) -> Value {
        json!({
            "ItemTypeId": item,
            "LocationId": 3005,
            "QualityLevel": 1,
            "UnitPriceSilver": price,
            "Amount": 2
        })
    }

    #[test]
    fn test_empty_store() {
        let (_dir, store) = test_store();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.list_orders(None).unwrap().is_empty());
        assert!(store.get_order(1).unwrap().is_none());
    }

    #[test]
    fn test_ingest_assigns_ids_and_scales_price() {
        let (_dir, store) = test_store();
        let inserted = store
            .ingest_batch(vec![raw_order("T4_BAG", 50000), raw_order("T5_BAG", 125000)])
            .unwrap();
        assert_eq!(inserted, 2);

        let order = store.get_order(1).unwrap().unwrap();
        assert_eq!(order["id"], json!(1));
        assert_eq!(order["ItemTypeId"], "T4_BAG");
        assert_eq!(order["UnitPriceSilver"].as_f64(), Some(5.0));
        assert_eq!(order["Amount"], json!(2));

        let order = store.get_order(2).unwrap().unwrap();
        assert_eq!(order["UnitPriceSilver"].as_f64(), Some(12.5));
    }

    #[test]
    fn test_invalid_record_rolls_back_batch() {
        let (_dir, store) = test_store();
        store.ingest_batch(vec![raw_order("T4_BAG", 10000)]).unwrap();

        let batch = vec![
            raw_order("T4_BAG", 10000),
            json!({"ItemTypeId": "T4_BAG", "UnitPriceSilver": "cheap"}),
            raw_order("T5_BAG", 10000),
        ];
        let result = store.ingest_batch(batch);
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_unknown_column_rolls_back_batch() {
        let (_dir, store) = test_store();
        let batch = vec![
            raw_order("T4_BAG", 10000),
            json!({"ItemTypeId": "T4_BAG", "UnitPriceSilver": 1, "Colour": "red"}),
        ];
        let result = store.ingest_batch(batch);
        assert!(matches!(result, Err(ApiError::BadRequest(msg)) if msg.contains("Colour")));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_case_colliding_fields_roll_back_batch() {
        let (_dir, store) = test_store();
        store.ingest_batch(vec![raw_order("T4_BAG", 10000)]).unwrap();

        let batch = vec![
            raw_order("T3_ORE", 10000),
            json!({"ItemTypeId": "T4_BAG", "itemTypeId": "T5_BAG", "UnitPriceSilver": 1}),
        ];
        let result = store.ingest_batch(batch);
        assert!(matches!(result, Err(ApiError::BadRequest(msg)) if msg.contains("order 1")));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_column_names_match_case_insensitively() {
        let (_dir, store) = test_store();
        store
            .ingest_batch(vec![json!({"itemtypeid": "T4_BAG", "UnitPriceSilver": 10000})])
            .unwrap();
        assert_eq!(store.list_orders(Some("T4_BAG")).unwrap().len(), 1);
    }

    #[test]
    fn test_constraint_violation_is_internal() {
        let (_dir, store) = test_store();
        // ItemTypeId is NOT NULL in the schema
        let result = store.ingest_batch(vec![
            raw_order("T4_BAG", 10000),
            json!({"UnitPriceSilver": 10000}),
        ]);
        assert!(matches!(result, Err(ApiError::Internal(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_empty_batch_inserts_nothing() {
        let (_dir, store) = test_store();
        assert_eq!(store.ingest_batch(Vec::new()).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_orders_filters_by_item_type() {
        let (_dir, store) = test_store();
        store
            .ingest_batch(vec![
                raw_order("T4_BAG", 10000),
                raw_order("T5_BAG", 20000),
                raw_order("T4_BAG", 30000),
            ])
            .unwrap();

        let all = store.list_orders(None).unwrap();
        let bags = store.list_orders(Some("T4_BAG")).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(bags.len(), 2);
        assert!(bags.iter().all(|o| o["ItemTypeId"] == "T4_BAG"));
        assert!(bags.iter().all(|o| all.contains(o)));
        assert!(store.list_orders(Some("T8_BAG")).unwrap().is_empty());
        assert_eq!(store.list_orders(Some("")).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_table_is_internal() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(dir.path().join("empty.sqlite3"));
        let result = store.ingest_batch(vec![raw_order("T4_BAG", 1)]);
        assert!(matches!(result, Err(ApiError::Internal(_))));
        assert!(matches!(store.list_orders(None), Err(ApiError::Internal(_))));
    }

    #[test]
    fn test_sql_value_conversions() {
        assert_eq!(to_sql_value(&json!(true)), SqlValue::Integer(1));
        assert_eq!(to_sql_value(&json!(7)), SqlValue::Integer(7));
        assert_eq!(to_sql_value(&json!(0.5)), SqlValue::Real(0.5));
        assert_eq!(to_sql_value(&json!("x")), SqlValue::Text("x".into()));
        assert_eq!(from_sql_value(ValueRef::Real(2.5)), json!(2.5));
        assert_eq!(from_sql_value(ValueRef::Null), Value::Null);
    }
}
