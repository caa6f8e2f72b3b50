//! Legacy quick-lookup index, keyed per category by internal id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::model::{Category, InternalId, ObjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    pub name: String,
    pub price: Option<i64>,
}

/// Two catalog rows of one category share an internal id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCollision {
    pub category: Category,
    pub internal_id: InternalId,
    pub replaced: ObjectId,
    pub kept: ObjectId,
}

impl std::fmt::Display for IndexCollision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} id {} (objectID {} replaced by {})",
            self.category, self.internal_id, self.replaced, self.kept
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyIndex {
    pub categories: BTreeMap<Category, BTreeMap<InternalId, IndexEntry>>,
    pub collisions: Vec<IndexCollision>,
}

impl LegacyIndex {
    /// Build the index from catalog rows. Internal ids only need to be
    /// unique within a category, so each category gets its own map.
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();

        for entry in catalog.entries() {
            let row = IndexEntry {
                id: entry.id,
                object_id: entry.object_id,
                name: entry.common.object_name.clone(),
                price: entry.common.avg_price,
            };

            let by_id = index.categories.entry(entry.category).or_default();
            if let Some(previous) = by_id.insert(entry.id, row) {
                tracing::warn!(
                    "Duplicate {} id {} in legacy index (objectID {} and {})",
                    entry.category,
                    entry.id,
                    previous.object_id,
                    entry.object_id
                );
                index.collisions.push(IndexCollision {
                    category: entry.category,
                    internal_id: entry.id,
                    replaced: previous.object_id,
                    kept: entry.object_id,
                });
            }
        }

        index
    }

    pub fn lookup(&self, category: Category, id: InternalId) -> Option<&IndexEntry> {
        self.categories.get(&category)?.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::extract;
    use crate::catalog::tests::{accessory, weapon};

    #[test]
    fn test_internal_ids_are_scoped_per_category() {
        let items = vec![weapon(1, 100, "M4A1"), accessory(1, 200, "Grip")];
        let index = LegacyIndex::build(&extract(&items).catalog);

        assert!(index.collisions.is_empty());
        assert_eq!(index.lookup(Category::Weapon, 1).unwrap().object_id, 100);
        assert_eq!(index.lookup(Category::Accessory, 1).unwrap().name, "Grip");
        assert_eq!(index.lookup(Category::Weapon, 1).unwrap().price, Some(1000));
        assert!(index.lookup(Category::Helmet, 1).is_none());
    }

    #[test]
    fn test_duplicate_internal_id_within_category() {
        let items = vec![weapon(7, 100, "M4A1"), weapon(7, 101, "AKM")];
        let index = LegacyIndex::build(&extract(&items).catalog);

        assert_eq!(index.collisions.len(), 1);
        assert_eq!(index.collisions[0].replaced, 100);
        assert_eq!(index.lookup(Category::Weapon, 7).unwrap().name, "AKM");
    }
}
