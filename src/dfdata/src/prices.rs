//! Price backfill from secondary price exports.
//!
//! Only price-missing catalog rows (null or zero `avgPrice`) are touched; a
//! recorded non-zero price is never overwritten.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::io::read_json;
use crate::model::ObjectId;

/// The two fields a price export row needs; everything else is ignored.
///
/// Exports are loose about types: ids and prices may arrive as numbers,
/// floats, or numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceRecord {
    #[serde(rename = "objectID", deserialize_with = "loose_object_id")]
    pub object_id: ObjectId,
    #[serde(rename = "avgPrice", default, deserialize_with = "loose_price")]
    pub avg_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Int(n) => ObjectId::try_from(*n).ok(),
            Self::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as ObjectId),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// `Ok(None)` for a blank string
    fn as_price(&self) -> std::result::Result<Option<i64>, ()> {
        match self {
            Self::Int(n) => Ok(Some(*n)),
            Self::Float(f) if f.is_finite() => Ok(Some(f.round() as i64)),
            Self::Float(_) => Err(()),
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                if let Ok(n) = s.parse::<i64>() {
                    return Ok(Some(n));
                }
                match s.parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(Some(f.round() as i64)),
                    _ => Err(()),
                }
            }
        }
    }
}

fn loose_object_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<ObjectId, D::Error> {
    let raw = LooseNumber::deserialize(deserializer)?;
    raw.as_object_id()
        .ok_or_else(|| de::Error::custom(format!("invalid objectID {:?}", raw)))
}

fn loose_price<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    match Option::<LooseNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => raw
            .as_price()
            .map_err(|_| de::Error::custom(format!("invalid avgPrice {:?}", raw))),
    }
}

/// Rows read from one price export
#[derive(Debug, Clone, Default)]
pub struct PriceRows {
    pub records: Vec<PriceRecord>,
    /// Rows with no usable objectID or price
    pub skipped: usize,
}

/// Load one price export. A file that is not an array is skipped with a
/// warning. Rows that do not parse are counted in [`PriceRows::skipped`].
pub fn load_price_records(path: &Path) -> Result<PriceRows> {
    let value: Value = read_json(path)?;
    let Value::Array(rows) = value else {
        tracing::warn!("{} is not an array, skipping", path.display());
        return Ok(PriceRows::default());
    };

    let mut loaded = PriceRows::default();
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<PriceRecord>(row) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                tracing::debug!("{} row {}: {}", path.display(), i, e);
                loaded.skipped += 1;
            }
        }
    }

    if loaded.skipped > 0 {
        tracing::warn!(
            "{}: skipped {} of {} rows with no usable objectID or avgPrice",
            path.display(),
            loaded.skipped,
            loaded.skipped + loaded.records.len()
        );
    }
    Ok(loaded)
}

/// objectID to price, merged from several exports
#[derive(Debug, Clone, Default)]
pub struct PriceSource {
    prices: HashMap<ObjectId, i64>,
}

impl PriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of records. Later batches override earlier ones; rows
    /// without a price are ignored.
    pub fn extend(&mut self, records: impl IntoIterator<Item = PriceRecord>) {
        for record in records {
            if let Some(price) = record.avg_price {
                self.prices.insert(record.object_id, price);
            }
        }
    }

    pub fn get(&self, object_id: ObjectId) -> Option<i64> {
        self.prices.get(&object_id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(ObjectId, i64)> for PriceSource {
    fn from_iter<T: IntoIterator<Item = (ObjectId, i64)>>(iter: T) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub total: usize,
    pub missing: usize,
    pub updated: usize,
    /// Still price-missing after the backfill, in catalog order
    pub still_missing: Vec<ObjectId>,
}

/// Fill price-missing catalog rows from `source`.
///
/// A zero source price does not count as a fill.
pub fn backfill(catalog: &mut Catalog, source: &PriceSource) -> BackfillReport {
    let mut report = BackfillReport {
        total: catalog.len(),
        ..Default::default()
    };

    for (object_id, entry) in catalog.items.iter_mut() {
        if !entry.common.is_price_missing() {
            continue;
        }
        report.missing += 1;

        match source.get(*object_id).filter(|p| *p != 0) {
            Some(price) => {
                tracing::debug!("Filled price for {}: {}", entry.common.object_name, price);
                entry.common.avg_price = Some(price);
                report.updated += 1;
            }
            None => report.still_missing.push(*object_id),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{extract, CatalogEntry};
    use crate::catalog::tests::{accessory, weapon};
    use std::fs;

    fn catalog_with(prices: &[(ObjectId, Option<i64>)]) -> Catalog {
        let items: Vec<_> = prices
            .iter()
            .map(|(id, _)| weapon(*id, *id, &format!("w{}", id)))
            .collect();
        let mut catalog = extract(&items).catalog;
        for (id, price) in prices {
            catalog.items.get_mut(id).unwrap().common.avg_price = *price;
        }
        catalog
    }

    #[test]
    fn test_zero_price_is_filled() {
        let mut catalog = catalog_with(&[(100, Some(0))]);
        let source: PriceSource = [(100, 5000)].into_iter().collect();

        let report = backfill(&mut catalog, &source);
        assert_eq!(catalog.get(100).unwrap().common.avg_price, Some(5000));
        assert_eq!(report.updated, 1);
        assert!(report.still_missing.is_empty());
    }

    #[test]
    fn test_recorded_price_is_never_overwritten() {
        let mut catalog = catalog_with(&[(200, Some(3000))]);
        let source: PriceSource = [(200, 1)].into_iter().collect();

        let report = backfill(&mut catalog, &source);
        assert_eq!(catalog.get(200).unwrap().common.avg_price, Some(3000));
        assert_eq!(report.missing, 0);
        assert_eq!(report.updated, 0);
    }

    #[test]
    fn test_null_price_and_unmatched_rows() {
        let mut catalog = catalog_with(&[(1, None), (2, None), (3, Some(0))]);
        let source: PriceSource = [(1, 700), (3, 0)].into_iter().collect();

        let report = backfill(&mut catalog, &source);
        assert_eq!(report.total, 3);
        assert_eq!(report.missing, 3);
        assert_eq!(report.updated, 1);
        assert_eq!(report.still_missing, vec![2, 3]);
    }

    #[test]
    fn test_later_sources_override_and_priceless_rows_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = temp_dir.path().join("accessories.json");
        let second = temp_dir.path().join("weapons.json");
        fs::write(
            &first,
            r#"[{"objectID": 1, "avgPrice": 10}, {"objectID": 2, "avgPrice": 20}, {"name": "junk"}]"#,
        )
        .unwrap();
        fs::write(
            &second,
            r#"[{"objectID": 1, "avgPrice": 15}, {"objectID": 2}]"#,
        )
        .unwrap();

        let mut source = PriceSource::new();
        source.extend(load_price_records(&first).unwrap().records);
        source.extend(load_price_records(&second).unwrap().records);

        assert_eq!(source.get(1), Some(15));
        assert_eq!(source.get(2), Some(20));
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_non_array_source_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gear.json");
        fs::write(&path, r#"{"objectID": 1, "avgPrice": 10}"#).unwrap();

        let rows = load_price_records(&path).unwrap();
        assert!(rows.records.is_empty());
        assert_eq!(rows.skipped, 0);
    }

    #[test]
    fn test_loosely_typed_rows_are_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("prices.json");
        fs::write(
            &path,
            r#"[
                {"objectID": "100", "avgPrice": 5000},
                {"objectID": 101, "avgPrice": 4500.4},
                {"objectID": 102, "avgPrice": " 120 "},
                {"objectID": 103, "avgPrice": null},
                {"objectID": "abc", "avgPrice": 1},
                {"objectID": 104, "avgPrice": "n/a"},
                {"bad": 1}
            ]"#,
        )
        .unwrap();

        let rows = load_price_records(&path).unwrap();
        assert_eq!(rows.records.len(), 4);
        assert_eq!(rows.skipped, 3);

        let mut source = PriceSource::new();
        source.extend(rows.records);
        assert_eq!(source.get(100), Some(5000));
        assert_eq!(source.get(101), Some(4500));
        assert_eq!(source.get(102), Some(120));
        assert_eq!(source.get(103), None);
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_backfill_spans_categories() {
        let items = vec![weapon(1, 10, "Rifle"), accessory(1, 20, "Grip")];
        let mut catalog = extract(&items).catalog;
        let entry: &mut CatalogEntry = catalog.items.get_mut(&20).unwrap();
        assert!(entry.common.is_price_missing());

        let source: PriceSource = [(20, 450)].into_iter().collect();
        let report = backfill(&mut catalog, &source);
        assert_eq!(report.updated, 1);
        assert_eq!(catalog.get(20).unwrap().common.avg_price, Some(450));
    }
}
