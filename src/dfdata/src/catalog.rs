//! Catalog extraction.
//!
//! Splits every item into its common sub-record (collected into the
//! [`Catalog`], keyed by object id) and its category-specific sub-record
//! (collected into one shard per category). Both halves keep the object id
//! so they can be joined back together.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::model::{Category, CommonAttrs, InternalId, Item, ItemSpec, ObjectId};

/// One catalog row: identifiers plus the common sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    pub category: Category,
    #[serde(flatten)]
    pub common: CommonAttrs,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.internal_id(),
            object_id: item.object_id(),
            category: item.category(),
            common: item.common.clone(),
            extra: Map::new(),
        }
    }
}

/// Two records resolved to the same object id; the later one was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    pub object_id: ObjectId,
    pub replaced: Category,
    pub kept: Category,
}

impl std::fmt::Display for Collision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "objectID {} ({} replaced by {})",
            self.object_id, self.replaced, self.kept
        )
    }
}

/// Object id to common attributes, across all categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub items: BTreeMap<ObjectId, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Last write wins; a replaced entry is returned as a
    /// collision and logged.
    pub fn insert(&mut self, entry: CatalogEntry) -> Option<Collision> {
        let kept = entry.category;
        let object_id = entry.object_id;
        let previous = self.items.insert(object_id, entry)?;

        tracing::warn!(
            "Duplicate objectID {}: {} entry replaced by {} entry",
            object_id,
            previous.category,
            kept
        );
        Some(Collision {
            object_id,
            replaced: previous.category,
            kept,
        })
    }

    /// Merge entries into the catalog, returning every collision
    pub fn merge(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) -> Vec<Collision> {
        entries
            .into_iter()
            .filter_map(|entry| self.insert(entry))
            .collect()
    }

    pub fn get(&self, object_id: ObjectId) -> Option<&CatalogEntry> {
        self.items.get(&object_id)
    }

    pub fn contains(&self, object_id: ObjectId) -> bool {
        self.items.contains_key(&object_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.items.values()
    }

    /// Entry count per category plural
    pub fn breakdown(&self) -> BTreeMap<String, usize> {
        let mut breakdown = BTreeMap::new();
        for entry in self.items.values() {
            *breakdown
                .entry(entry.category.plural().to_string())
                .or_insert(0) += 1;
        }
        breakdown
    }
}

/// Result of splitting a universe into catalog and spec shards
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub catalog: Catalog,
    pub shards: BTreeMap<Category, Vec<ItemSpec>>,
    pub collisions: Vec<Collision>,
}

impl Extraction {
    /// Object ids from `items` that have no catalog row. Non-empty means
    /// the extraction is broken.
    pub fn missing_from_catalog(&self, items: &[Item]) -> Vec<ObjectId> {
        items
            .iter()
            .map(Item::object_id)
            .filter(|id| !self.catalog.contains(*id))
            .collect()
    }

    /// Input record count per category plural
    pub fn breakdown(&self) -> BTreeMap<String, usize> {
        self.shards
            .iter()
            .map(|(category, specs)| (category.plural().to_string(), specs.len()))
            .collect()
    }

    pub fn shard(&self, category: Category) -> &[ItemSpec] {
        self.shards.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Split every item into a catalog row and a spec record.
pub fn extract(items: &[Item]) -> Extraction {
    let mut extraction = Extraction::default();

    for item in items {
        if let Some(collision) = extraction.catalog.insert(CatalogEntry::from_item(item)) {
            extraction.collisions.push(collision);
        }
        extraction
            .shards
            .entry(item.category())
            .or_default()
            .push(item.spec.clone());
    }

    tracing::info!(
        "Extracted {} catalog entries across {} categories",
        extraction.catalog.len(),
        extraction.shards.len()
    );
    extraction
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{AccessorySpec, GearSpec, ProtectiveSpec, WeaponSpec};

    pub(crate) fn common(name: &str, price: Option<i64>) -> CommonAttrs {
        CommonAttrs {
            object_name: name.to_string(),
            grade: 3,
            avg_price: price,
            picture: Some(format!("https://img.example.com/{}.png", name)),
            ..Default::default()
        }
    }

    pub(crate) fn weapon(id: InternalId, object_id: ObjectId, name: &str) -> Item {
        Item {
            common: common(name, Some(1000)),
            spec: ItemSpec::Weapon(WeaponSpec {
                id,
                object_id,
                weapon_type: "Rifle".to_string().into(),
                ..Default::default()
            }),
        }
    }

    pub(crate) fn accessory(id: InternalId, object_id: ObjectId, name: &str) -> Item {
        Item {
            common: common(name, None),
            spec: ItemSpec::Accessory(AccessorySpec {
                id,
                object_id,
                accessory_type: "muzzle".to_string().into(),
                ..Default::default()
            }),
        }
    }

    fn universe() -> Vec<Item> {
        vec![
            weapon(1, 100, "M4A1"),
            weapon(2, 101, "AKM"),
            accessory(1, 200, "Suppressor"),
            Item {
                common: common("Helmet", Some(0)),
                spec: ItemSpec::Helmet(ProtectiveSpec {
                    id: 1,
                    object_id: 300,
                    ..Default::default()
                }),
            },
            Item {
                common: common("Pack", Some(50)),
                spec: ItemSpec::Backpack(GearSpec {
                    id: 1,
                    object_id: 400,
                    ..Default::default()
                }),
            },
        ]
    }

    #[test]
    fn test_every_item_lands_once() {
        let items = universe();
        let extraction = extract(&items);

        assert_eq!(extraction.catalog.len(), items.len());
        assert!(extraction.missing_from_catalog(&items).is_empty());
        assert!(extraction.collisions.is_empty());

        for item in &items {
            let matching: usize = extraction
                .shards
                .values()
                .flatten()
                .filter(|s| s.object_id() == item.object_id())
                .count();
            assert_eq!(matching, 1);
            assert_eq!(
                extraction.catalog.get(item.object_id()).map(|e| e.category),
                Some(item.category())
            );
        }
    }

    #[test]
    fn test_catalog_strips_nothing_and_specs_carry_join_key() {
        let items = universe();
        let extraction = extract(&items);

        let entry = extraction.catalog.get(100).unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.common.object_name, "M4A1");

        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["objectID"], 100);
        assert_eq!(value["category"], "weapon");
        assert_eq!(value["objectName"], "M4A1");

        let spec = &extraction.shard(Category::Weapon)[0];
        let value = serde_json::to_value(spec).unwrap();
        assert_eq!(value["objectID"], 100);
        assert!(value.get("objectName").is_none());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let items = universe();
        let first = serde_json::to_string(&extract(&items).catalog).unwrap();
        let second = serde_json::to_string(&extract(&items).catalog).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_object_id_is_reported() {
        let mut items = universe();
        items.push(accessory(9, 100, "Imposter"));

        let extraction = extract(&items);
        assert_eq!(
            extraction.collisions,
            vec![Collision {
                object_id: 100,
                replaced: Category::Weapon,
                kept: Category::Accessory,
            }]
        );
        assert_eq!(
            extraction.catalog.get(100).unwrap().common.object_name,
            "Imposter"
        );
        // Both records still have a spec shard entry
        assert_eq!(extraction.shard(Category::Weapon).len(), 2);
        assert_eq!(extraction.shard(Category::Accessory).len(), 2);
    }

    #[test]
    fn test_breakdown() {
        let extraction = extract(&universe());
        let breakdown = extraction.breakdown();
        assert_eq!(breakdown.get("weapons"), Some(&2));
        assert_eq!(breakdown.get("backpacks"), Some(&1));
        assert_eq!(breakdown.get("chests"), None);
        assert_eq!(extraction.catalog.breakdown(), breakdown);
    }

    #[test]
    fn test_catalog_entry_preserves_unknown_fields() {
        let entry: CatalogEntry = serde_json::from_value(serde_json::json!({
            "id": 5,
            "objectID": 77,
            "category": "consumable",
            "objectName": "Bandage",
            "avgPrice": 0,
            "marketTag": "medical"
        }))
        .unwrap();

        assert_eq!(entry.common.object_name, "Bandage");
        assert_eq!(entry.extra.get("marketTag"), Some(&serde_json::json!("medical")));
        assert!(!entry.extra.contains_key("objectName"));
    }
}
