//! Slot/accessory compatibility join and dynamic slot complexity.
//!
//! Compatibility is declared per slot type. A weapon accepts the union,
//! over its slots, of the accessories declared for each slot's type.
//! Grouping maps are built locally from the declared direction of each
//! relation and returned by value.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::model::ObjectId;
use crate::slots::{DynamicSlotEffect, Slot, SlotAccessory, SlotAction, SlotId, SlotSystem};

/// weaponId to its slots, in table order
pub fn group_slots_by_weapon(slots: &[Slot]) -> HashMap<ObjectId, Vec<&Slot>> {
    let mut by_weapon: HashMap<ObjectId, Vec<&Slot>> = HashMap::new();
    for slot in slots {
        by_weapon.entry(slot.weapon_id).or_default().push(slot);
    }
    by_weapon
}

/// slotId to the accessories declared compatible with it
pub fn group_accessories_by_slot(pairs: &[SlotAccessory]) -> HashMap<&SlotId, Vec<ObjectId>> {
    let mut by_slot: HashMap<&SlotId, Vec<ObjectId>> = HashMap::new();
    for pair in pairs {
        by_slot.entry(&pair.slot_id).or_default().push(pair.accessory_id);
    }
    by_slot
}

/// Reverse index: accessoryId to the slot types it fits
pub fn accessory_slots(pairs: &[SlotAccessory]) -> HashMap<ObjectId, BTreeSet<&SlotId>> {
    let mut by_accessory: HashMap<ObjectId, BTreeSet<&SlotId>> = HashMap::new();
    for pair in pairs {
        by_accessory
            .entry(pair.accessory_id)
            .or_default()
            .insert(&pair.slot_id);
    }
    by_accessory
}

/// Derived compatibility for one weapon
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponCompatibility {
    pub weapon_id: ObjectId,
    /// Slots that resolved to a known slot type
    pub slots: usize,
    /// Union of accessories over all slots; each accessory once
    pub accessories: BTreeSet<ObjectId>,
    /// Slot type label to how many of this weapon's slots use it
    pub slot_types: BTreeMap<String, usize>,
}

impl WeaponCompatibility {
    pub fn accessory_count(&self) -> usize {
        self.accessories.len()
    }
}

/// Relation rows skipped during the join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanCounts {
    /// Slots whose weaponId is not a known weapon
    pub unknown_weapon: usize,
    /// Slots whose slotId is not a declared slot type
    pub unknown_slot_type: usize,
}

impl OrphanCounts {
    pub fn total(&self) -> usize {
        self.unknown_weapon + self.unknown_slot_type
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompatibilityJoin {
    /// One row per known weapon, in the order given
    pub weapons: Vec<WeaponCompatibility>,
    pub orphans: OrphanCounts,
}

impl CompatibilityJoin {
    pub fn get(&self, weapon_id: ObjectId) -> Option<&WeaponCompatibility> {
        self.weapons.iter().find(|w| w.weapon_id == weapon_id)
    }
}

fn slot_label(slot: &Slot) -> String {
    slot.slot_type
        .clone()
        .or_else(|| slot.slot_name.clone())
        .unwrap_or_else(|| slot.slot_id.to_string())
}

/// Compute every weapon's compatible accessory set.
///
/// `weapons` lists the known weapon object ids. Slots pointing at an
/// unknown weapon or an undeclared slot type are skipped and counted. A
/// weapon with no slots gets an empty row.
pub fn join_compatibility(weapons: &[ObjectId], system: &SlotSystem) -> CompatibilityJoin {
    let known_weapons: HashSet<ObjectId> = weapons.iter().copied().collect();
    let known_types: HashSet<&SlotId> = system.slot_types.iter().map(|t| &t.slot_id).collect();
    let by_slot = group_accessories_by_slot(&system.slot_accessories);

    let mut orphans = OrphanCounts::default();
    let mut rows: HashMap<ObjectId, WeaponCompatibility> = HashMap::new();

    for (weapon_id, slots) in group_slots_by_weapon(&system.weapon_slots) {
        if !known_weapons.contains(&weapon_id) {
            orphans.unknown_weapon += slots.len();
            continue;
        }

        let row = rows.entry(weapon_id).or_default();
        for slot in slots {
            if !known_types.contains(&slot.slot_id) {
                orphans.unknown_slot_type += 1;
                continue;
            }
            row.slots += 1;
            *row.slot_types.entry(slot_label(slot)).or_insert(0) += 1;
            if let Some(accessories) = by_slot.get(&slot.slot_id) {
                row.accessories.extend(accessories.iter().copied());
            }
        }
    }

    if orphans.total() > 0 {
        tracing::warn!(
            "Skipped {} orphaned weapon slots ({} unknown weapon, {} unknown slot type)",
            orphans.total(),
            orphans.unknown_weapon,
            orphans.unknown_slot_type
        );
    }

    let mut seen = HashSet::new();
    let weapons = weapons
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|&weapon_id| {
            let mut row = rows.remove(&weapon_id).unwrap_or_default();
            row.weapon_id = weapon_id;
            row
        })
        .collect();

    CompatibilityJoin { weapons, orphans }
}

/// Add/remove effect counts for one accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessoryComplexity {
    pub accessory_id: ObjectId,
    pub adds: usize,
    pub removes: usize,
}

impl AccessoryComplexity {
    pub fn score(&self) -> usize {
        self.adds + self.removes
    }
}

/// Group dynamic effects by accessory, in order of first appearance.
pub fn dynamic_complexity(effects: &[DynamicSlotEffect]) -> Vec<AccessoryComplexity> {
    let mut positions: HashMap<ObjectId, usize> = HashMap::new();
    let mut rows: Vec<AccessoryComplexity> = Vec::new();

    for effect in effects {
        let pos = *positions.entry(effect.accessory_id).or_insert_with(|| {
            rows.push(AccessoryComplexity {
                accessory_id: effect.accessory_id,
                adds: 0,
                removes: 0,
            });
            rows.len() - 1
        });
        match effect.action {
            SlotAction::Add => rows[pos].adds += 1,
            SlotAction::Remove => rows[pos].removes += 1,
        }
    }

    rows
}

/// Accessories by complexity, highest first, ties in first-appearance order
pub fn rank_by_complexity(effects: &[DynamicSlotEffect]) -> Vec<AccessoryComplexity> {
    crate::stats::rank_desc(dynamic_complexity(effects), AccessoryComplexity::score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn system(value: serde_json::Value) -> SlotSystem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_union_counts_shared_accessory_once() {
        let system = system(json!({
            "slotTypes": [{ "slotId": "A" }, { "slotId": "B" }],
            "weaponSlots": [
                { "weaponId": 1, "slotId": "A", "slotOrder": 1 },
                { "weaponId": 1, "slotId": "B", "slotOrder": 2 }
            ],
            "slotAccessories": [
                { "slotId": "A", "accessoryId": 10 },
                { "slotId": "A", "accessoryId": 11 },
                { "slotId": "B", "accessoryId": 11 },
                { "slotId": "B", "accessoryId": 12 }
            ]
        }));

        let join = join_compatibility(&[1], &system);
        let row = join.get(1).unwrap();
        assert_eq!(row.accessories, BTreeSet::from([10, 11, 12]));
        assert_eq!(row.accessory_count(), 3);
        assert_eq!(row.slots, 2);
        assert_eq!(join.orphans, OrphanCounts::default());
    }

    #[test]
    fn test_slots_grouped_per_weapon_in_table_order() {
        let system = system(json!({
            "weaponSlots": [
                { "weaponId": 1, "slotId": "B", "slotOrder": 2 },
                { "weaponId": 2, "slotId": "A", "slotOrder": 1 },
                { "weaponId": 1, "slotId": "A", "slotOrder": 1 }
            ]
        }));

        let groups = group_slots_by_weapon(&system.weapon_slots);
        assert_eq!(groups.len(), 2);
        let ids: Vec<_> = groups[&1].iter().map(|s| s.slot_id.to_string()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(groups[&2].len(), 1);
    }

    #[test]
    fn test_orphans_counted_per_slot() {
        let system = system(json!({
            "slotTypes": [{ "slotId": "A" }],
            "weaponSlots": [
                { "weaponId": 1, "slotId": "A" },
                { "weaponId": 1, "slotId": "Z" },
                { "weaponId": 9, "slotId": "A" },
                { "weaponId": 9, "slotId": "Z" }
            ],
            "slotAccessories": [{ "slotId": "A", "accessoryId": 10 }]
        }));

        let join = join_compatibility(&[1], &system);
        assert_eq!(join.orphans.unknown_weapon, 2);
        assert_eq!(join.orphans.unknown_slot_type, 1);
        let row = join.get(1).unwrap();
        assert_eq!(row.slots, 1);
        assert_eq!(row.accessories, BTreeSet::from([10]));
    }

    #[test]
    fn test_weapon_without_slots_is_empty() {
        let system = system(json!({ "slotTypes": [{ "slotId": "A" }] }));
        let join = join_compatibility(&[1, 2], &system);

        assert_eq!(join.weapons.len(), 2);
        assert!(join.weapons.iter().all(|w| w.accessories.is_empty() && w.slots == 0));
        assert_eq!(join.weapons[1].weapon_id, 2);
    }

    #[test]
    fn test_slot_type_without_compatibilities() {
        let system = system(json!({
            "slotTypes": [{ "slotId": 7 }],
            "weaponSlots": [{ "weaponId": 1, "slotId": 7 }]
        }));
        let join = join_compatibility(&[1], &system);
        let row = join.get(1).unwrap();
        assert_eq!(row.slots, 1);
        assert!(row.accessories.is_empty());
    }

    #[test]
    fn test_orphans_are_counted_not_fatal() {
        let system = system(json!({
            "slotTypes": [{ "slotId": "A" }],
            "weaponSlots": [
                { "weaponId": 1, "slotId": "A" },
                { "weaponId": 99, "slotId": "A" },
                { "weaponId": 1, "slotId": "ghost" }
            ],
            "slotAccessories": [{ "slotId": "A", "accessoryId": 10 }]
        }));

        let join = join_compatibility(&[1], &system);
        assert_eq!(join.orphans.unknown_weapon, 1);
        assert_eq!(join.orphans.unknown_slot_type, 1);
        assert!(join.get(99).is_none());
        assert_eq!(join.get(1).unwrap().slots, 1);
    }

    #[test]
    fn test_slot_type_labels() {
        let system = system(json!({
            "slotTypes": [{ "slotId": "A" }, { "slotId": "B" }],
            "weaponSlots": [
                { "weaponId": 1, "slotId": "A", "slotType": "muzzle" },
                { "weaponId": 1, "slotId": "B", "slotName": "Optic" },
                { "weaponId": 1, "slotId": "A", "slotType": "muzzle" }
            ]
        }));
        let join = join_compatibility(&[1], &system);
        let labels = &join.get(1).unwrap().slot_types;
        assert_eq!(labels.get("muzzle"), Some(&2));
        assert_eq!(labels.get("Optic"), Some(&1));
    }

    #[test]
    fn test_reverse_index() {
        let pairs: Vec<SlotAccessory> = serde_json::from_value(json!([
            { "slotId": "A", "accessoryId": 10 },
            { "slotId": "B", "accessoryId": 10 },
            { "slotId": "B", "accessoryId": 11 }
        ]))
        .unwrap();

        let reverse = accessory_slots(&pairs);
        assert_eq!(reverse[&10u64].len(), 2);
        assert_eq!(reverse[&11u64].len(), 1);

        let forward = group_accessories_by_slot(&pairs);
        assert_eq!(forward[&SlotId::from("B")], vec![10, 11]);
    }

    #[test]
    fn test_complexity_ranking_is_stable() {
        let effects: Vec<DynamicSlotEffect> = serde_json::from_value(json!([
            { "accessoryId": 1, "slotId": 1, "action": "add" },
            { "accessoryId": 2, "slotId": 1, "action": "add" },
            { "accessoryId": 1, "slotId": 2, "action": "remove" },
            { "accessoryId": 3, "slotId": 1, "action": "remove" },
            { "accessoryId": 2, "slotId": 2, "action": "remove" },
            { "accessoryId": 1, "slotId": 3, "action": "add" },
            { "accessoryId": 3, "slotId": 2, "action": "add" },
            { "accessoryId": 3, "slotId": 3, "action": "add" }
        ]))
        .unwrap();

        let ranked = rank_by_complexity(&effects);
        let order: Vec<_> = ranked.iter().map(|c| (c.accessory_id, c.score())).collect();
        assert_eq!(order, vec![(1, 3), (3, 3), (2, 2)]);
        assert_eq!(ranked[0].adds, 2);
        assert_eq!(ranked[0].removes, 1);
    }
}
