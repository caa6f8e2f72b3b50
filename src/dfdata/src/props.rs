//! Prop export splitting.
//!
//! Prop records arrive as one flat array. `secondClass` decides the
//! category: `collection` records become collectibles, `consume` records
//! become consumables, and everything else is counted and dropped.

use serde::Deserialize;
use serde_json::{Number, Value};
use std::path::Path;

use crate::error::{DataError, Result};
use crate::io::read_json;
use crate::model::{
    CollectibleSpec, CommonAttrs, ConsumableSpec, InternalId, Item, ItemSpec, ObjectId,
};

/// One row of the prop export
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropRecord {
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(default)]
    pub id: Option<InternalId>,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub avg_price: Option<i64>,
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub pic: Option<String>,
    #[serde(default)]
    pub pre_pic: Option<String>,
    #[serde(default)]
    pub length: Option<Number>,
    #[serde(default)]
    pub width: Option<Number>,
    #[serde(default)]
    pub weight: Option<Number>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub second_class: Option<String>,
    #[serde(default)]
    pub third_class: Option<String>,
    #[serde(rename = "thirdClassCN", default)]
    pub third_class_cn: Option<String>,
    #[serde(default)]
    pub props_detail: Option<Value>,
}

impl PropRecord {
    fn common(&self) -> CommonAttrs {
        CommonAttrs {
            object_name: self.object_name.clone().unwrap_or_default(),
            grade: self.grade.unwrap_or(0),
            avg_price: Some(self.avg_price.unwrap_or(0)),
            weight: self.weight.clone(),
            picture: Some(self.pic.clone().unwrap_or_default()),
            pre_picture: self.pre_pic.clone().filter(|p| !p.is_empty()),
            ..Default::default()
        }
    }

    fn detail_str(&self, key: &str) -> String {
        self.props_detail
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn into_collectible(self) -> Item {
        let common = self.common();
        let collectible_type = self.detail_str("type");
        let source = self.detail_str("propsSource");
        let spec = CollectibleSpec {
            id: self.id.unwrap_or_default(),
            object_id: self.object_id,
            length: self.length,
            width: self.width,
            weight: self.weight,
            collectible_type,
            source,
            desc: self.desc.unwrap_or_default(),
            extra: Default::default(),
        };
        Item {
            common,
            spec: ItemSpec::Collectible(spec),
        }
    }

    fn into_consumable(self) -> Item {
        let common = self.common();
        let spec = ConsumableSpec {
            id: self.id.unwrap_or_default(),
            object_id: self.object_id,
            length: self.length,
            width: self.width,
            weight: self.weight,
            third_class: self.third_class.unwrap_or_default(),
            third_class_cn: self.third_class_cn.unwrap_or_default(),
            desc: self.desc.unwrap_or_default(),
            props_detail: Some(
                self.props_detail
                    .unwrap_or_else(|| Value::Object(Default::default())),
            ),
            extra: Default::default(),
        };
        Item {
            common,
            spec: ItemSpec::Consumable(spec),
        }
    }
}

/// Props sorted into item categories
#[derive(Debug, Clone, Default)]
pub struct PropSplit {
    pub collectibles: Vec<Item>,
    pub consumables: Vec<Item>,
    /// Records with any other `secondClass`
    pub others: usize,
}

impl PropSplit {
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.collectibles.iter().chain(self.consumables.iter())
    }
}

/// Sort prop records by `secondClass`.
pub fn split_props(records: Vec<PropRecord>) -> PropSplit {
    let mut split = PropSplit::default();

    for record in records {
        match record.second_class.as_deref() {
            Some("collection") => split.collectibles.push(record.into_collectible()),
            Some("consume") => split.consumables.push(record.into_consumable()),
            _ => split.others += 1,
        }
    }

    tracing::info!(
        "Props: {} collectibles, {} consumables, {} other",
        split.collectibles.len(),
        split.consumables.len(),
        split.others
    );
    split
}

/// Load the prop export. The file must hold a JSON array.
pub fn load_props(path: &Path) -> Result<Vec<PropRecord>> {
    let value: Value = read_json(path)?;
    if !value.is_array() {
        return Err(DataError::Shape {
            path: path.to_path_buf(),
            reason: "expected an array of prop records".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use serde_json::json;
    use std::fs;

    fn records() -> Vec<PropRecord> {
        serde_json::from_value(json!([
            {
                "objectID": 15080050001u64,
                "id": 1,
                "objectName": "Gold Watch",
                "avgPrice": 88000,
                "grade": 5,
                "pic": "https://img.example.com/watch.png",
                "prePic": "https://img.example.com/watch_pre.png",
                "length": 1,
                "width": 1,
                "weight": 0.2,
                "desc": "Shiny",
                "secondClass": "collection",
                "propsDetail": { "type": "jewelry", "propsSource": "vault" }
            },
            {
                "objectID": 14020000001u64,
                "objectName": "Bandage",
                "secondClass": "consume",
                "thirdClass": "medical",
                "thirdClassCN": "医疗",
                "propsDetail": { "hp": 20 }
            },
            { "objectID": 1, "secondClass": "key" },
            { "objectID": 2 }
        ]))
        .unwrap()
    }

    #[test]
    fn test_split_by_second_class() {
        let split = split_props(records());
        assert_eq!(split.collectibles.len(), 1);
        assert_eq!(split.consumables.len(), 1);
        assert_eq!(split.others, 2);
        assert_eq!(split.items().count(), 2);
    }

    #[test]
    fn test_collectible_fields() {
        let split = split_props(records());
        let item = &split.collectibles[0];

        assert_eq!(item.category(), Category::Collectible);
        assert_eq!(item.common.object_name, "Gold Watch");
        assert_eq!(item.common.picture.as_deref(), Some("https://img.example.com/watch.png"));
        assert_eq!(
            item.common.pre_picture.as_deref(),
            Some("https://img.example.com/watch_pre.png")
        );

        let ItemSpec::Collectible(spec) = &item.spec else {
            panic!("expected collectible");
        };
        assert_eq!(spec.collectible_type, "jewelry");
        assert_eq!(spec.source, "vault");
        assert_eq!(spec.desc, "Shiny");
    }

    #[test]
    fn test_consumable_defaults() {
        let split = split_props(records());
        let item = &split.consumables[0];

        assert_eq!(item.internal_id(), 0);
        assert_eq!(item.common.avg_price, Some(0));
        assert!(item.common.is_price_missing());
        assert!(item.common.pre_picture.is_none());

        let ItemSpec::Consumable(spec) = &item.spec else {
            panic!("expected consumable");
        };
        assert_eq!(spec.third_class_cn, "医疗");
        assert_eq!(spec.props_detail, Some(json!({ "hp": 20 })));
    }

    #[test]
    fn test_non_array_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("price.json");
        fs::write(&path, r#"{"items": []}"#).unwrap();

        let err = load_props(&path).unwrap_err();
        assert!(matches!(err, DataError::Shape { .. }));
    }

    #[test]
    fn test_load_props() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("price.json");
        fs::write(&path, r#"[{"objectID": 5, "secondClass": "consume"}]"#).unwrap();

        let records = load_props(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_id, 5);
    }
}
