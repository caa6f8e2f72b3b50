//! Output document layouts.
//!
//! Each file written by a batch job is a `metadata` block plus a payload.
//! Builders take the export timestamp as an argument so two runs over the
//! same input differ only in `exportTime`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::index::{IndexEntry, LegacyIndex};
use crate::model::{Category, InternalId, ItemSpec};
use crate::slots::{SlotCounts, SlotSystem};

/// Output file names
pub const CATALOG_FILE: &str = "items_catalog.json";
pub const SLOT_SYSTEM_FILE: &str = "slot_system.json";
pub const INDEX_FILE: &str = "index.json";
pub const IMAGE_INDEX_FILE: &str = "image_index.json";
pub const FAILED_DOWNLOADS_FILE: &str = "failed_downloads.json";

/// `weapons_spec.json`, `accessories_spec.json`, ...
pub fn spec_file_name(category: Category) -> String {
    format!("{}_spec.json", category.plural())
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub breakdown: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `items_catalog.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    #[serde(default)]
    pub items: Catalog,
}

impl CatalogDocument {
    pub fn new(items: Catalog, version: Option<Value>, at: DateTime<Utc>) -> Self {
        let mut doc = Self {
            metadata: CatalogMetadata {
                category: "items_catalog".to_string(),
                description: "Common attributes of every item, keyed by objectID".to_string(),
                version,
                ..Default::default()
            },
            items,
        };
        doc.refresh(at);
        doc
    }

    /// Recompute counts and stamp the export time after the catalog changed
    pub fn refresh(&mut self, at: DateTime<Utc>) {
        if self.metadata.category.is_empty() {
            self.metadata.category = "items_catalog".to_string();
        }
        self.metadata.total_count = self.items.len();
        self.metadata.breakdown = self.items.breakdown();
        self.metadata.export_time = Some(timestamp(at));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMetadata {
    pub category: String,
    pub description: String,
    pub count: usize,
    pub note: String,
    pub export_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

/// `<plural>_spec.json`: category-specific records without the common part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecDocument<'a> {
    pub metadata: SpecMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<&'a [Value]>,
    pub items: &'a [ItemSpec],
}

impl<'a> SpecDocument<'a> {
    pub fn new(
        category: Category,
        items: &'a [ItemSpec],
        categories: Option<&'a [Value]>,
        version: Option<Value>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            metadata: SpecMetadata {
                category: format!("{}_specifications", category.plural()),
                description: format!(
                    "{} attributes without common fields; pair with {}",
                    category, CATALOG_FILE
                ),
                count: items.len(),
                note: format!("Join on objectID to {} for name, price and picture", CATALOG_FILE),
                export_time: timestamp(at),
                version,
            },
            categories,
            items,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotMetadata {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub counts: SlotCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `slot_system.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSystemDocument {
    #[serde(default)]
    pub metadata: SlotMetadata,
    #[serde(flatten)]
    pub system: SlotSystem,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SlotSystemDocument {
    pub fn new(system: SlotSystem, version: Option<Value>, at: DateTime<Utc>) -> Self {
        Self {
            metadata: SlotMetadata {
                category: "slot_system".to_string(),
                description: "Weapon slots and accessory compatibility".to_string(),
                counts: system.counts(),
                export_time: Some(timestamp(at)),
                version,
                extra: Map::new(),
            },
            system,
            extra: Map::new(),
        }
    }

    /// Reduce to the baseline slot set. Returns `(original, removed)`
    /// weapon slot counts.
    pub fn retain_unlocked(&mut self) -> (usize, usize) {
        let original = self.system.weapon_slots.len();
        let removed = self.system.retain_unlocked();
        self.metadata.counts.weapon_slots = self.system.weapon_slots.len();
        (original, removed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    pub category: String,
    pub description: String,
    pub export_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

/// `index.json`: category plural to internal id to lookup row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyIndexDocument<'a> {
    pub metadata: IndexMetadata,
    #[serde(flatten)]
    pub categories: BTreeMap<&'static str, &'a BTreeMap<InternalId, IndexEntry>>,
}

impl<'a> LegacyIndexDocument<'a> {
    pub fn new(index: &'a LegacyIndex, version: Option<Value>, at: DateTime<Utc>) -> Self {
        Self {
            metadata: IndexMetadata {
                category: "index".to_string(),
                description: "Quick lookup by category and internal id".to_string(),
                export_time: timestamp(at),
                version,
            },
            categories: index
                .categories
                .iter()
                .map(|(category, rows)| (category.plural(), rows))
                .collect(),
        }
    }
}
