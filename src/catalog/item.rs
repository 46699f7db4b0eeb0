//! Catalog Item Module
//!
//! Defines the item categories and the opaque item record.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the identifying field every item carries.
pub const UNIQUE_NAME_FIELD: &str = "uniquename";

// == Item Type ==
/// The fixed set of item groups found in the catalog file.
///
/// Declaration order is the order groups are flattened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Farmable,
    Simple,
    Consumable,
    Equipment,
    Weapon,
    Mount,
    Furniture,
    Journal,
}

impl ItemType {
    /// All groups in flattening order.
    pub const ALL: [ItemType; 8] = [
        ItemType::Farmable,
        ItemType::Simple,
        ItemType::Consumable,
        ItemType::Equipment,
        ItemType::Weapon,
        ItemType::Mount,
        ItemType::Furniture,
        ItemType::Journal,
    ];

    /// Key of this group under the catalog's `items` object.
    pub fn key(self) -> &'static str {
        match self {
            ItemType::Farmable => "farmableitem",
            ItemType::Simple => "simpleitem",
            ItemType::Consumable => "consumableitem",
            ItemType::Equipment => "equipmentitem",
            ItemType::Weapon => "weapon",
            ItemType::Mount => "mount",
            ItemType::Furniture => "furnitureitem",
            ItemType::Journal => "journalitem",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// == Item ==
/// A single catalog entry.
///
/// Items keep every field of the source record and serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Item {
    fields: Map<String, Value>,
}

impl Item {
    /// Wraps a record, returning `None` unless it has a string `uniquename`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        fields
            .get(UNIQUE_NAME_FIELD)
            .is_some_and(Value::is_string)
            .then_some(Self { fields })
    }

    /// The item's unique name.
    pub fn uniquename(&self) -> &str {
        self.fields
            .get(UNIQUE_NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
