//! Slot relation tables: slot types, weapon slots, slot/accessory
//! compatibility, and dynamic slot effects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::ObjectId;

/// Slot type identifier. The export uses both numbers and strings, and the
/// original form is kept on output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotId {
    Numeric(u64),
    Named(String),
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Named(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self::Named(s.to_string())
    }
}

impl From<u64> for SlotId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotType {
    pub slot_id: SlotId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_unlock() -> bool {
    true
}

/// A mounting point on one weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub weapon_id: ObjectId,
    pub slot_id: SlotId,
    #[serde(default)]
    pub slot_order: i64,
    #[serde(default = "default_unlock")]
    pub unlock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declares that an accessory fits any slot of the given type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAccessory {
    pub slot_id: SlotId,
    pub accessory_id: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotAction {
    Add,
    Remove,
}

impl std::fmt::Display for SlotAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Mounting `accessory_id` adds or removes the `slot_id` slot at runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSlotEffect {
    pub accessory_id: ObjectId,
    pub slot_id: SlotId,
    pub action: SlotAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The four relation tables, as they appear in the export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSystem {
    #[serde(default)]
    pub slot_types: Vec<SlotType>,
    #[serde(default)]
    pub weapon_slots: Vec<Slot>,
    #[serde(default)]
    pub slot_accessories: Vec<SlotAccessory>,
    #[serde(default)]
    pub accessory_dynamic_slots: Vec<DynamicSlotEffect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCounts {
    pub slot_types: usize,
    pub weapon_slots: usize,
    pub slot_accessories: usize,
    pub dynamic_slots: usize,
}

impl SlotSystem {
    pub fn counts(&self) -> SlotCounts {
        SlotCounts {
            slot_types: self.slot_types.len(),
            weapon_slots: self.weapon_slots.len(),
            slot_accessories: self.slot_accessories.len(),
            dynamic_slots: self.accessory_dynamic_slots.len(),
        }
    }

    /// Drop locked weapon slots, leaving the baseline set. Returns how many
    /// were removed.
    pub fn retain_unlocked(&mut self) -> usize {
        let before = self.weapon_slots.len();
        self.weapon_slots.retain(|s| s.unlock);
        before - self.weapon_slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slot_id_round_trips_both_forms() {
        let slots: Vec<SlotType> = serde_json::from_value(json!([
            { "slotId": 12, "slotName": "Muzzle" },
            { "slotId": "scope", "slotName": "Optic", "icon": "s.png" }
        ]))
        .unwrap();

        assert_eq!(slots[0].slot_id, SlotId::Numeric(12));
        assert_eq!(slots[1].slot_id, SlotId::from("scope"));
        assert_eq!(slots[1].extra.get("icon"), Some(&json!("s.png")));

        let back = serde_json::to_value(&slots).unwrap();
        assert_eq!(back[0]["slotId"], json!(12));
        assert_eq!(back[1]["slotId"], json!("scope"));
        assert_eq!(back[1]["icon"], json!("s.png"));
    }

    #[test]
    fn test_unlock_defaults_to_true() {
        let slot: Slot = serde_json::from_value(json!({
            "weaponId": 100,
            "slotId": "muzzle",
            "slotOrder": 1
        }))
        .unwrap();
        assert!(slot.unlock);
    }

    #[test]
    fn test_retain_unlocked() {
        let mut system: SlotSystem = serde_json::from_value(json!({
            "weaponSlots": [
                { "weaponId": 1, "slotId": "a", "unlock": true },
                { "weaponId": 1, "slotId": "b", "unlock": false },
                { "weaponId": 2, "slotId": "a" },
                { "weaponId": 2, "slotId": "c", "unlock": false }
            ]
        }))
        .unwrap();

        assert_eq!(system.retain_unlocked(), 2);
        assert_eq!(system.counts().weapon_slots, 2);
        assert!(system.weapon_slots.iter().all(|s| s.unlock));
        assert_eq!(system.retain_unlocked(), 0);
    }

    #[test]
    fn test_dynamic_action_parse() {
        let effect: DynamicSlotEffect = serde_json::from_value(json!({
            "accessoryId": 5,
            "slotId": 3,
            "action": "remove"
        }))
        .unwrap();
        assert_eq!(effect.action, SlotAction::Remove);
        assert_eq!(effect.action.to_string(), "remove");
    }
}
