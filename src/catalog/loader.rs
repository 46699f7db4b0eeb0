//! Catalog Loader Module
//!
//! Parses the item file once at startup into a flat, read-only sequence.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::{Item, ItemType};
use crate::error::CatalogError;

// == Catalog ==
/// The static item catalog.
///
/// Items are stored group by group in [`ItemType::ALL`] order, each group in
/// file order. Nothing mutates a catalog after it is built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    /// uniquename -> position of its first occurrence
    index: HashMap<String, usize>,
    group_lens: HashMap<ItemType, usize>,
}

impl Catalog {
    /// Reads and parses the catalog file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        info!(
            "Loaded {} catalog items from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parses a catalog document held in memory.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: Value = serde_json::from_str(raw)?;
        Self::from_value(document)
    }

    /// Builds a catalog from an already parsed document.
    pub fn from_value(mut document: Value) -> Result<Self, CatalogError> {
        let groups = document
            .get_mut("items")
            .and_then(Value::as_object_mut)
            .ok_or(CatalogError::MissingItems)?;

        let mut catalog = Self::default();
        for item_type in ItemType::ALL {
            let group = groups
                .remove(item_type.key())
                .ok_or(CatalogError::MissingGroup(item_type.key()))?;
            let Value::Array(records) = group else {
                return Err(CatalogError::InvalidGroup(item_type.key()));
            };

            catalog.group_lens.insert(item_type, records.len());
            for (index, record) in records.into_iter().enumerate() {
                let item = Item::from_value(record).ok_or(CatalogError::InvalidItem {
                    group: item_type.key(),
                    index,
                })?;
                catalog.push(item);
            }
            debug!(
                "Catalog group {} has {} items",
                item_type,
                catalog.group_len(item_type)
            );
        }

        Ok(catalog)
    }

    fn push(&mut self, item: Item) {
        let position = self.items.len();
        self.index
            .entry(item.uniquename().to_string())
            .or_insert(position);
        self.items.push(item);
    }

    /// Every item, flattened in group order.
    pub fn all_items(&self) -> &[Item] {
        &self.items
    }

    /// First item whose `uniquename` equals `name` exactly.
    pub fn find_by_unique_name(&self, name: &str) -> Option<&Item> {
        self.index.get(name).map(|&position| &self.items[position])
    }

    /// Number of items the file listed under `item_type`.
    pub fn group_len(&self, item_type: ItemType) -> usize {
        self.group_lens.get(&item_type).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "items": {
                "farmableitem": [{"uniquename": "T3_FARM_CARROT_SEED"}],
                "simpleitem": [{"uniquename": "T2_ROCK"}, {"uniquename": "T3_ORE"}],
                "consumableitem": [],
                "equipmentitem": [{"uniquename": "T4_HEAD_PLATE_SET1"}],
                "weapon": [{"uniquename": "T4_MAIN_SWORD"}],
                "mount": [{"uniquename": "T3_MOUNT_HORSE"}],
                "furnitureitem": [],
                "journalitem": [{"uniquename": "T2_JOURNAL_WARRIOR_EMPTY"}],
                "shopcategories": {"ignored": true}
            }
        })
    }

    #[test]
    fn test_flattens_groups_in_fixed_order() {
        let catalog = Catalog::from_value(document()).unwrap();
        let names: Vec<_> = catalog.all_items().iter().map(Item::uniquename).collect();
        assert_eq!(
            names,
            vec![
                "T3_FARM_CARROT_SEED",
                "T2_ROCK",
                "T3_ORE",
                "T4_HEAD_PLATE_SET1",
                "T4_MAIN_SWORD",
                "T3_MOUNT_HORSE",
                "T2_JOURNAL_WARRIOR_EMPTY",
            ]
        );
    }

    #[test]
    fn test_len_is_sum_of_groups() {
        let catalog = Catalog::from_value(document()).unwrap();
        let total: usize = ItemType::ALL.iter().map(|t| catalog.group_len(*t)).sum();
        assert_eq!(catalog.len(), total);
        assert_eq!(catalog.group_len(ItemType::Simple), 2);
        assert_eq!(catalog.group_len(ItemType::Consumable), 0);
    }

    #[test]
    fn test_find_by_unique_name() {
        let catalog = Catalog::from_value(document()).unwrap();
        let item = catalog.find_by_unique_name("T4_MAIN_SWORD").unwrap();
        assert_eq!(item.uniquename(), "T4_MAIN_SWORD");
        assert!(catalog.find_by_unique_name("t4_main_sword").is_none());
        assert!(catalog.find_by_unique_name("").is_none());
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let mut doc = document();
        doc["items"]["weapon"] = json!([
            {"uniquename": "T3_ORE", "dup": true}
        ]);
        let catalog = Catalog::from_value(doc).unwrap();
        assert!(catalog.find_by_unique_name("T3_ORE").unwrap().get("dup").is_none());
    }

    #[test]
    fn test_missing_group_is_an_error() {
        let mut doc = document();
        doc["items"].as_object_mut().unwrap().remove("mount");
        assert!(matches!(
            Catalog::from_value(doc),
            Err(CatalogError::MissingGroup("mount"))
        ));
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        assert!(matches!(
            Catalog::from_json_str("{not json"),
            Err(CatalogError::Json(_))
        ));
        assert!(matches!(
            Catalog::from_value(json!({"things": {}})),
            Err(CatalogError::MissingItems)
        ));

        let mut doc = document();
        doc["items"]["weapon"] = json!({"uniquename": "T4_MAIN_SWORD"});
        assert!(matches!(
            Catalog::from_value(doc),
            Err(CatalogError::InvalidGroup("weapon"))
        ));

        let mut doc = document();
        doc["items"]["simpleitem"] = json!([{"uniquename": "T2_ROCK"}, {"tier": 3}]);
        assert!(matches!(
            Catalog::from_value(doc),
            Err(CatalogError::InvalidItem { group: "simpleitem", index: 1 })
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Catalog::load("/nonexistent/items.json");
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
