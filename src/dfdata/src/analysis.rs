//! Report builders for the `analyze` and `relations` jobs.
//!
//! Everything here is a pure function of a loaded [`Universe`]. Printing is
//! left to the caller.

use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};

use crate::model::{
    as_f64, AccessorySpec, Category, CommonAttrs, Nullable, ObjectId, Universe, WeaponSpec,
};
use crate::relations::{join_compatibility, rank_by_complexity, OrphanCounts};
use crate::slots::{SlotAction, SlotCounts, SlotId};
use crate::stats::{
    distribution, distribution_by_value, rank_desc, summarize, top_n, Frequency, NumericSummary,
};

const TOP_WEAPONS: usize = 10;
const TOP_COMPLEX: usize = 10;
const TOP_SLOT_TYPES: usize = 15;

/// Display label for a loosely typed attribute. Null means absent.
fn label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer level for ordinal attributes such as protection or penetration
fn level(n: &Nullable<Number>) -> Option<i64> {
    let n = n.get()?;
    n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))
}

fn price(p: Option<i64>) -> Option<f64> {
    p.filter(|p| *p != 0).map(|p| p as f64)
}

/// Field name to how many records hold `null` there, most first
fn null_counts<'a, T>(records: impl Iterator<Item = &'a T>) -> Vec<(String, usize)>
where
    T: Serialize + 'a,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let Ok(Value::Object(fields)) = serde_json::to_value(record) else {
            continue;
        };
        for (key, value) in fields {
            if value.is_null() {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }
    rank_desc(counts.into_iter().collect(), |(_, count)| *count)
}

#[derive(Debug, Clone, Default)]
pub struct WeaponReport {
    pub count: usize,
    pub types: Vec<Frequency<String>>,
    pub calibers: Vec<Frequency<String>>,
    pub fire_modes: Vec<Frequency<String>>,
    pub grades: Vec<Frequency<u8>>,
    pub price: Option<NumericSummary>,
    pub parameters: Vec<(&'static str, Option<NumericSummary>)>,
    pub weight: Option<NumericSummary>,
    pub width: Option<NumericSummary>,
    pub height: Option<NumericSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct AccessoryReport {
    pub count: usize,
    pub types: Vec<Frequency<String>>,
    pub grades: Vec<Frequency<u8>>,
    pub price: Option<NumericSummary>,
    pub quick_separate: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AmmunitionReport {
    pub count: usize,
    pub calibers: Vec<Frequency<String>>,
    pub penetration_levels: Vec<Frequency<i64>>,
    pub armor_harm_levels: Vec<Frequency<String>>,
    pub harm_ratio: Option<NumericSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct ProtectionReport {
    pub helmets: usize,
    pub helmet_levels: Vec<Frequency<i64>>,
    pub armors: usize,
    pub armor_levels: Vec<Frequency<i64>>,
    pub chests: usize,
    pub backpacks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SlotReport {
    pub counts: SlotCounts,
    pub actions: Vec<Frequency<SlotAction>>,
    /// Over weapons that have at least one slot
    pub slots_per_weapon: Option<NumericSummary>,
    /// Over accessories that fit at least one slot type
    pub slots_per_accessory: Option<NumericSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub weapon_nulls: Vec<(String, usize)>,
    pub accessory_nulls: Vec<(String, usize)>,
    pub banned_weapons: usize,
    pub banned_accessories: usize,
}

/// Descriptive statistics over the whole dump
#[derive(Debug, Clone, Default)]
pub struct ItemReport {
    pub weapons: WeaponReport,
    pub accessories: AccessoryReport,
    pub ammunition: AmmunitionReport,
    pub protection: ProtectionReport,
    pub slots: SlotReport,
    pub quality: QualityReport,
}

fn weapon_report(universe: &Universe) -> WeaponReport {
    let weapons: Vec<_> = universe.weapons().collect();

    let parameters = WeaponSpec::default()
        .parameters()
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            let summary = summarize(weapons.iter().map(|(_, w)| w.parameters()[i].1));
            (*name, summary)
        })
        .collect();

    WeaponReport {
        count: weapons.len(),
        types: distribution(weapons.iter().map(|(_, w)| w.weapon_type.get().cloned())),
        calibers: distribution(weapons.iter().map(|(_, w)| w.caliber.get().cloned())),
        fire_modes: distribution(
            weapons
                .iter()
                .map(|(_, w)| w.fire_mode.get().and_then(label)),
        ),
        grades: distribution_by_value(weapons.iter().map(|(c, _)| Some(c.grade))),
        price: summarize(weapons.iter().map(|(c, _)| price(c.avg_price))),
        parameters,
        weight: summarize(weapons.iter().map(|(c, _)| c.weight_kg())),
        width: summarize(weapons.iter().map(|(c, _)| c.width.map(f64::from))),
        height: summarize(weapons.iter().map(|(c, _)| c.height.map(f64::from))),
    }
}

fn accessory_report(universe: &Universe) -> AccessoryReport {
    let accessories: Vec<_> = universe.accessories().collect();

    AccessoryReport {
        count: accessories.len(),
        types: distribution(accessories.iter().map(|(_, a)| a.accessory_type.get().cloned())),
        grades: distribution_by_value(accessories.iter().map(|(c, _)| Some(c.grade))),
        price: summarize(accessories.iter().map(|(c, _)| price(c.avg_price))),
        quick_separate: accessories
            .iter()
            .filter(|(_, a)| a.quick_separate.get().copied().unwrap_or(false))
            .count(),
    }
}

fn ammunition_report(universe: &Universe) -> AmmunitionReport {
    let ammo: Vec<_> = universe.ammunitions().map(|(_, a)| a).collect();

    AmmunitionReport {
        count: ammo.len(),
        calibers: distribution(ammo.iter().map(|a| a.caliber.get().cloned())),
        penetration_levels: distribution_by_value(
            ammo.iter().map(|a| level(&a.penetration_level)),
        ),
        armor_harm_levels: distribution(
            ammo.iter().map(|a| a.armor_harm_level.get().and_then(label)),
        ),
        harm_ratio: summarize(ammo.iter().map(|a| as_f64(&a.harm_ratio))),
    }
}

fn protection_report(universe: &Universe) -> ProtectionReport {
    ProtectionReport {
        helmets: universe.count(Category::Helmet),
        helmet_levels: distribution_by_value(
            universe.helmets().map(|h| level(&h.protect_level)),
        ),
        armors: universe.count(Category::Armor),
        armor_levels: distribution_by_value(
            universe.armors().map(|a| level(&a.protect_level)),
        ),
        chests: universe.count(Category::Chest),
        backpacks: universe.count(Category::Backpack),
    }
}

fn slot_report(universe: &Universe) -> SlotReport {
    let system = &universe.slots;

    let mut per_weapon: HashMap<ObjectId, usize> = HashMap::new();
    for slot in &system.weapon_slots {
        *per_weapon.entry(slot.weapon_id).or_insert(0) += 1;
    }
    let mut per_accessory: HashMap<ObjectId, usize> = HashMap::new();
    for pair in &system.slot_accessories {
        *per_accessory.entry(pair.accessory_id).or_insert(0) += 1;
    }

    SlotReport {
        counts: system.counts(),
        actions: distribution(system.accessory_dynamic_slots.iter().map(|d| Some(d.action))),
        slots_per_weapon: summarize(per_weapon.values().map(|n| Some(*n as f64))),
        slots_per_accessory: summarize(per_accessory.values().map(|n| Some(*n as f64))),
    }
}

fn quality_report(universe: &Universe) -> QualityReport {
    QualityReport {
        weapon_nulls: null_counts(universe.weapons().map(|(_, w)| w)),
        accessory_nulls: null_counts(universe.accessories().map(|(_, a)| a)),
        banned_weapons: universe.weapons().filter(|(c, _)| c.is_banned()).count(),
        banned_accessories: universe.accessories().filter(|(c, _)| c.is_banned()).count(),
    }
}

pub fn item_report(universe: &Universe) -> ItemReport {
    ItemReport {
        weapons: weapon_report(universe),
        accessories: accessory_report(universe),
        ammunition: ammunition_report(universe),
        protection: protection_report(universe),
        slots: slot_report(universe),
        quality: quality_report(universe),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedWeapon {
    pub object_id: ObjectId,
    pub name: String,
    pub accessories: usize,
    pub slots: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexAccessory {
    pub object_id: ObjectId,
    pub name: String,
    pub accessory_type: String,
    pub adds: usize,
    pub removes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotTypeUsage {
    pub slot_id: SlotId,
    pub name: String,
    pub uses: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponTypeCapacity {
    pub weapon_type: String,
    pub weapons: usize,
    pub avg_slots: f64,
    pub avg_accessories: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaliberCoverage {
    pub caliber: String,
    pub ammo_variants: usize,
    pub weapons: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradePrices {
    pub grade: u8,
    pub summary: NumericSummary,
}

/// Derived relations over weapons, accessories, slots and ammunition
#[derive(Debug, Clone, Default)]
pub struct RelationsReport {
    pub top_weapons: Vec<RankedWeapon>,
    /// Accessory type to number of slot compatibilities, known accessories only
    pub accessory_type_usage: Vec<Frequency<String>>,
    pub adding_accessories: usize,
    pub removing_accessories: usize,
    pub complex_accessories: Vec<ComplexAccessory>,
    pub slot_type_usage: Vec<SlotTypeUsage>,
    pub weapon_types: Vec<WeaponTypeCapacity>,
    pub calibers: Vec<CaliberCoverage>,
    pub grade_prices: Vec<GradePrices>,
    pub orphans: OrphanCounts,
}

pub fn relations_report(universe: &Universe) -> RelationsReport {
    let system = &universe.slots;
    let weapons: HashMap<ObjectId, (&CommonAttrs, &WeaponSpec)> =
        universe.weapons().map(|(c, w)| (w.object_id, (c, w))).collect();
    let accessories: HashMap<ObjectId, (&CommonAttrs, &AccessorySpec)> =
        universe.accessories().map(|(c, a)| (a.object_id, (c, a))).collect();

    let weapon_ids = universe.object_ids(Category::Weapon);
    let join = join_compatibility(&weapon_ids, system);

    let top_weapons = top_n(join.weapons.clone(), TOP_WEAPONS, |w| w.accessory_count())
        .into_iter()
        .map(|w| RankedWeapon {
            object_id: w.weapon_id,
            name: weapons
                .get(&w.weapon_id)
                .map(|(c, _)| c.object_name.clone())
                .unwrap_or_default(),
            accessories: w.accessory_count(),
            slots: w.slots,
        })
        .collect();

    let accessory_type_usage = distribution(system.slot_accessories.iter().map(|pair| {
        accessories
            .get(&pair.accessory_id)
            .map(|(_, a)| a.accessory_type.get().cloned().unwrap_or_default())
    }));

    let complexity = rank_by_complexity(&system.accessory_dynamic_slots);
    let adding_accessories = complexity.iter().filter(|c| c.adds > 0).count();
    let removing_accessories = complexity.iter().filter(|c| c.removes > 0).count();
    let complex_accessories = complexity
        .iter()
        .filter(|c| c.score() > 1)
        .filter_map(|c| {
            let (common, spec) = accessories.get(&c.accessory_id)?;
            Some(ComplexAccessory {
                object_id: c.accessory_id,
                name: common.object_name.clone(),
                accessory_type: spec.accessory_type.get().cloned().unwrap_or_default(),
                adds: c.adds,
                removes: c.removes,
            })
        })
        .take(TOP_COMPLEX)
        .collect();

    let slot_names: HashMap<&SlotId, String> = system
        .slot_types
        .iter()
        .map(|t| {
            let name = t.slot_name.clone().unwrap_or_else(|| t.slot_id.to_string());
            (&t.slot_id, name)
        })
        .collect();
    let slot_type_usage = distribution(system.weapon_slots.iter().map(|s| Some(&s.slot_id)))
        .into_iter()
        .filter_map(|f| {
            let name = slot_names.get(f.value)?.clone();
            Some(SlotTypeUsage {
                slot_id: f.value.clone(),
                name,
                uses: f.count,
            })
        })
        .take(TOP_SLOT_TYPES)
        .collect();

    let mut by_type: BTreeMap<String, (usize, usize, usize)> = BTreeMap::new();
    for row in &join.weapons {
        if row.slots == 0 {
            continue;
        }
        let Some((_, spec)) = weapons.get(&row.weapon_id) else {
            continue;
        };
        let key = spec.weapon_type.get().cloned().unwrap_or_default();
        let totals = by_type.entry(key).or_default();
        totals.0 += 1;
        totals.1 += row.slots;
        totals.2 += row.accessory_count();
    }
    let weapon_types = by_type
        .into_iter()
        .map(|(weapon_type, (count, slots, accs))| WeaponTypeCapacity {
            weapon_type,
            weapons: count,
            avg_slots: slots as f64 / count as f64,
            avg_accessories: accs as f64 / count as f64,
        })
        .collect();

    let calibers = distribution(universe.ammunitions().map(|(_, a)| a.caliber.get().cloned()))
        .into_iter()
        .map(|f| CaliberCoverage {
            weapons: universe
                .weapons()
                .filter(|(_, w)| w.caliber.get().map(String::as_str) == Some(f.value.as_str()))
                .count(),
            caliber: f.value,
            ammo_variants: f.count,
        })
        .collect();

    let mut grade_values: BTreeMap<u8, Vec<Option<f64>>> = BTreeMap::new();
    let priced = universe
        .weapons()
        .map(|(c, _)| c)
        .chain(universe.accessories().map(|(c, _)| c));
    for common in priced {
        if let Some(p) = price(common.avg_price) {
            grade_values.entry(common.grade).or_default().push(Some(p));
        }
    }
    let grade_prices = grade_values
        .into_iter()
        .filter_map(|(grade, values)| {
            summarize(values).map(|summary| GradePrices { grade, summary })
        })
        .collect();

    RelationsReport {
        top_weapons,
        accessory_type_usage,
        adding_accessories,
        removing_accessories,
        complex_accessories,
        slot_type_usage,
        weapon_types,
        calibers,
        grade_prices,
        orphans: join.orphans,
    }
}
