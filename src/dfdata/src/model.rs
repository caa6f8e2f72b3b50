//! Item data model.
//!
//! Every item carries a common sub-record ([`CommonAttrs`]) plus a
//! category-specific sub-record ([`ItemSpec`]). The raw export nests the
//! common part under a `regular` key; [`ItemDump::into_universe`] turns the
//! per-category arrays into one flat sequence of [`Item`]s.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::slots::SlotSystem;

/// Globally unique item identifier, stable across categories.
pub type ObjectId = u64;

/// Legacy identifier, unique only within one category.
pub type InternalId = u64;

/// Reads an explicit `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A typed attribute that keeps "key missing" apart from "key set to null",
/// so a record written back out has exactly the keys it was read with.
///
/// Pair with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Nullable<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Nullable<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl<T> From<T> for Nullable<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Present))
    }
}

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Weapon,
    Accessory,
    Ammunition,
    Helmet,
    Armor,
    Chest,
    Backpack,
    Collectible,
    Consumable,
}

impl Category {
    /// All categories, in export order
    pub const ALL: &'static [Category] = &[
        Category::Weapon,
        Category::Accessory,
        Category::Ammunition,
        Category::Helmet,
        Category::Armor,
        Category::Chest,
        Category::Backpack,
        Category::Collectible,
        Category::Consumable,
    ];

    /// Plural form, used for file names, image folders, and index keys
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Weapon => "weapons",
            Self::Accessory => "accessories",
            Self::Ammunition => "ammunitions",
            Self::Helmet => "helmets",
            Self::Armor => "armors",
            Self::Chest => "chests",
            Self::Backpack => "backpacks",
            Self::Collectible => "collectibles",
            Self::Consumable => "consumables",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weapon => write!(f, "weapon"),
            Self::Accessory => write!(f, "accessory"),
            Self::Ammunition => write!(f, "ammunition"),
            Self::Helmet => write!(f, "helmet"),
            Self::Armor => write!(f, "armor"),
            Self::Chest => write!(f, "chest"),
            Self::Backpack => write!(f, "backpack"),
            Self::Collectible => write!(f, "collectible"),
            Self::Consumable => write!(f, "consumable"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weapon" | "weapons" => Ok(Self::Weapon),
            "accessory" | "accessories" => Ok(Self::Accessory),
            "ammunition" | "ammunitions" => Ok(Self::Ammunition),
            "helmet" | "helmets" => Ok(Self::Helmet),
            "armor" | "armors" => Ok(Self::Armor),
            "chest" | "chests" => Ok(Self::Chest),
            "backpack" | "backpacks" => Ok(Self::Backpack),
            "collectible" | "collectibles" => Ok(Self::Collectible),
            "consumable" | "consumables" => Ok(Self::Consumable),
            _ => Err(ParseError::InvalidCategory(s.to_string())),
        }
    }
}

/// Parse errors for string conversions
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}

/// Attributes shared by every item (the `regular` block of the export).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonAttrs {
    #[serde(rename = "objectName", default, deserialize_with = "null_as_default")]
    pub object_name: String,
    /// Grid width
    #[serde(default)]
    pub width: Option<u32>,
    /// Grid height
    #[serde(default)]
    pub height: Option<u32>,
    /// Quality tier, 0-6
    #[serde(default, deserialize_with = "null_as_default")]
    pub grade: u8,
    #[serde(default)]
    pub weight: Option<Number>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(rename = "bannedOnMarket", default)]
    pub banned_on_market: Option<bool>,
    #[serde(rename = "avgPrice", default)]
    pub avg_price: Option<i64>,
    #[serde(rename = "avgPriceEN", default)]
    pub avg_price_en: Option<i64>,
    #[serde(rename = "basePriceEN", default)]
    pub base_price_en: Option<i64>,
    #[serde(rename = "updatedEN", default)]
    pub updated_en: Option<String>,
    /// Secondary "preview" picture; only props carry one
    #[serde(rename = "prePicture", default, skip_serializing_if = "Option::is_none")]
    pub pre_picture: Option<String>,
}

impl CommonAttrs {
    /// Average price, treating zero as missing
    pub fn price(&self) -> Option<i64> {
        self.avg_price.filter(|p| *p != 0)
    }

    pub fn is_price_missing(&self) -> bool {
        self.price().is_none()
    }

    pub fn is_banned(&self) -> bool {
        self.banned_on_market.unwrap_or(false)
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.as_ref().and_then(Number::as_f64)
    }
}

/// Weapon-specific attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(rename = "type", default, skip_serializing_if = "Nullable::is_absent")]
    pub weapon_type: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub caliber: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub fire_mode: Nullable<Value>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub meat_harm: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub armor_harm: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub recoil: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub control: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub stable: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub hip_shot: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub shoot_distance: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub fire_speed: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub capacity: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub muzzle_velocity: Nullable<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeaponSpec {
    /// Combat parameters with display labels, in report order
    pub fn parameters(&self) -> [(&'static str, Option<f64>); 10] {
        [
            ("Flesh damage", as_f64(&self.meat_harm)),
            ("Armor damage", as_f64(&self.armor_harm)),
            ("Recoil", as_f64(&self.recoil)),
            ("Control", as_f64(&self.control)),
            ("Stability", as_f64(&self.stable)),
            ("Hip-fire accuracy", as_f64(&self.hip_shot)),
            ("Range", as_f64(&self.shoot_distance)),
            ("Fire rate", as_f64(&self.fire_speed)),
            ("Magazine capacity", as_f64(&self.capacity)),
            ("Muzzle velocity", as_f64(&self.muzzle_velocity)),
        ]
    }
}

/// Accessory-specific attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorySpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(rename = "type", default, skip_serializing_if = "Nullable::is_absent")]
    pub accessory_type: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub quick_separate: Nullable<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ammunition-specific attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmmunitionSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub caliber: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub penetration_level: Nullable<Number>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub armor_harm_level: Nullable<Value>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub harm_ratio: Nullable<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Helmets and body armor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectiveSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub protect_level: Nullable<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Chest rigs and backpacks. Nothing beyond the identifiers is typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GearSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Collectible props
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectibleSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(default)]
    pub length: Option<Number>,
    #[serde(default)]
    pub width: Option<Number>,
    #[serde(default)]
    pub weight: Option<Number>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub collectible_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Consumable props
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumableSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(default)]
    pub length: Option<Number>,
    #[serde(default)]
    pub width: Option<Number>,
    #[serde(default)]
    pub weight: Option<Number>,
    #[serde(rename = "thirdClass", default, deserialize_with = "null_as_default")]
    pub third_class: String,
    #[serde(rename = "thirdClassCN", default, deserialize_with = "null_as_default")]
    pub third_class_cn: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(rename = "propsDetail", default)]
    pub props_detail: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Category-specific sub-record, tagged by category.
///
/// Serializes as the bare payload: spec files are homogeneous, so the
/// category is implied by the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemSpec {
    Weapon(WeaponSpec),
    Accessory(AccessorySpec),
    Ammunition(AmmunitionSpec),
    Helmet(ProtectiveSpec),
    Armor(ProtectiveSpec),
    Chest(GearSpec),
    Backpack(GearSpec),
    Collectible(CollectibleSpec),
    Consumable(ConsumableSpec),
}

impl ItemSpec {
    pub fn category(&self) -> Category {
        match self {
            Self::Weapon(_) => Category::Weapon,
            Self::Accessory(_) => Category::Accessory,
            Self::Ammunition(_) => Category::Ammunition,
            Self::Helmet(_) => Category::Helmet,
            Self::Armor(_) => Category::Armor,
            Self::Chest(_) => Category::Chest,
            Self::Backpack(_) => Category::Backpack,
            Self::Collectible(_) => Category::Collectible,
            Self::Consumable(_) => Category::Consumable,
        }
    }

    pub fn object_id(&self) -> ObjectId {
        match self {
            Self::Weapon(s) => s.object_id,
            Self::Accessory(s) => s.object_id,
            Self::Ammunition(s) => s.object_id,
            Self::Helmet(s) | Self::Armor(s) => s.object_id,
            Self::Chest(s) | Self::Backpack(s) => s.object_id,
            Self::Collectible(s) => s.object_id,
            Self::Consumable(s) => s.object_id,
        }
    }

    pub fn internal_id(&self) -> InternalId {
        match self {
            Self::Weapon(s) => s.id,
            Self::Accessory(s) => s.id,
            Self::Ammunition(s) => s.id,
            Self::Helmet(s) | Self::Armor(s) => s.id,
            Self::Chest(s) | Self::Backpack(s) => s.id,
            Self::Collectible(s) => s.id,
            Self::Consumable(s) => s.id,
        }
    }
}

/// One item of the universe
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub common: CommonAttrs,
    pub spec: ItemSpec,
}

impl Item {
    pub fn object_id(&self) -> ObjectId {
        self.spec.object_id()
    }

    pub fn internal_id(&self) -> InternalId {
        self.spec.internal_id()
    }

    pub fn category(&self) -> Category {
        self.spec.category()
    }
}

/// An item as it appears in the export: category fields at the top level,
/// common fields nested under `regular`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem<S> {
    #[serde(rename = "regular", default)]
    pub common: CommonAttrs,
    #[serde(flatten)]
    pub spec: S,
}

/// Export-level metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpMetadata {
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The monolithic export document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDump {
    #[serde(default)]
    pub metadata: DumpMetadata,
    #[serde(default)]
    pub weapons: Vec<RawItem<WeaponSpec>>,
    #[serde(default)]
    pub accessories: Vec<RawItem<AccessorySpec>>,
    #[serde(default)]
    pub ammunitions: Vec<RawItem<AmmunitionSpec>>,
    #[serde(default)]
    pub helmets: Vec<RawItem<ProtectiveSpec>>,
    #[serde(default)]
    pub armors: Vec<RawItem<ProtectiveSpec>>,
    #[serde(default)]
    pub chests: Vec<RawItem<GearSpec>>,
    #[serde(default)]
    pub backpacks: Vec<RawItem<GearSpec>>,
    #[serde(default)]
    pub collectibles: Vec<RawItem<CollectibleSpec>>,
    #[serde(default)]
    pub consumables: Vec<RawItem<ConsumableSpec>>,
    #[serde(default)]
    pub weapon_categories: Vec<Value>,
    #[serde(default)]
    pub accessory_categories: Vec<Value>,
    #[serde(flatten)]
    pub slots: SlotSystem,
}

fn tag<S>(raw: Vec<RawItem<S>>, wrap: fn(S) -> ItemSpec) -> impl Iterator<Item = Item> {
    raw.into_iter().map(move |r| Item {
        common: r.common,
        spec: wrap(r.spec),
    })
}

impl ItemDump {
    /// Flatten the per-category arrays into a single item sequence.
    pub fn into_universe(self) -> Universe {
        let items = tag(self.weapons, ItemSpec::Weapon)
            .chain(tag(self.accessories, ItemSpec::Accessory))
            .chain(tag(self.ammunitions, ItemSpec::Ammunition))
            .chain(tag(self.helmets, ItemSpec::Helmet))
            .chain(tag(self.armors, ItemSpec::Armor))
            .chain(tag(self.chests, ItemSpec::Chest))
            .chain(tag(self.backpacks, ItemSpec::Backpack))
            .chain(tag(self.collectibles, ItemSpec::Collectible))
            .chain(tag(self.consumables, ItemSpec::Consumable))
            .collect();

        Universe {
            version: self.metadata.version,
            items,
            weapon_categories: self.weapon_categories,
            accessory_categories: self.accessory_categories,
            slots: self.slots,
        }
    }
}

/// Every item plus the slot relation tables, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub version: Option<Value>,
    pub items: Vec<Item>,
    pub weapon_categories: Vec<Value>,
    pub accessory_categories: Vec<Value>,
    pub slots: SlotSystem,
}

impl Universe {
    pub fn count(&self, category: Category) -> usize {
        self.items.iter().filter(|i| i.category() == category).count()
    }

    /// Object ids of one category, in input order
    pub fn object_ids(&self, category: Category) -> Vec<ObjectId> {
        self.items
            .iter()
            .filter(|i| i.category() == category)
            .map(Item::object_id)
            .collect()
    }

    pub fn weapons(&self) -> impl Iterator<Item = (&CommonAttrs, &WeaponSpec)> {
        self.items.iter().filter_map(|i| match &i.spec {
            ItemSpec::Weapon(s) => Some((&i.common, s)),
            _ => None,
        })
    }

    pub fn accessories(&self) -> impl Iterator<Item = (&CommonAttrs, &AccessorySpec)> {
        self.items.iter().filter_map(|i| match &i.spec {
            ItemSpec::Accessory(s) => Some((&i.common, s)),
            _ => None,
        })
    }

    pub fn ammunitions(&self) -> impl Iterator<Item = (&CommonAttrs, &AmmunitionSpec)> {
        self.items.iter().filter_map(|i| match &i.spec {
            ItemSpec::Ammunition(s) => Some((&i.common, s)),
            _ => None,
        })
    }

    pub fn helmets(&self) -> impl Iterator<Item = &ProtectiveSpec> {
        self.items.iter().filter_map(|i| match &i.spec {
            ItemSpec::Helmet(s) => Some(s),
            _ => None,
        })
    }

    pub fn armors(&self) -> impl Iterator<Item = &ProtectiveSpec> {
        self.items.iter().filter_map(|i| match &i.spec {
            ItemSpec::Armor(s) => Some(s),
            _ => None,
        })
    }
}

/// Numeric attribute as f64, if present
pub fn as_f64(n: &Nullable<Number>) -> Option<f64> {
    n.get().and_then(Number::as_f64)
}
