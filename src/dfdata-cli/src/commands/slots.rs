//! Baseline slot set command

use anyhow::{Context, Result};
use dfdata::documents::SlotSystemDocument;
use dfdata::io::{read_json, write_json};
use std::path::Path;

/// Drop locked weapon slots and rewrite `path`. Returns `(original, removed)`.
pub fn baseline(path: &Path) -> Result<(usize, usize)> {
    let mut doc: SlotSystemDocument = read_json(path)
        .with_context(|| format!("Failed to load slot system {}", path.display()))?;

    let counts = doc.retain_unlocked();

    write_json(path, &doc)
        .with_context(|| format!("Failed to write slot system {}", path.display()))?;
    Ok(counts)
}

pub fn run(path: &Path) -> Result<()> {
    let (original, removed) = baseline(path)?;

    println!("Original weapon slots: {}", original);
    println!("Baseline weapon slots: {}", original - removed);
    println!("Removed locked slots:  {}", removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;

    #[test]
    fn test_rewrites_without_locked_slots() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("slot_system.json");
        let doc = json!({
            "metadata": {
                "category": "slot_system",
                "counts": { "slotTypes": 1, "weaponSlots": 3, "slotAccessories": 0,
                            "dynamicSlots": 0 },
                "source": "export"
            },
            "slotTypes": [{ "slotId": 5, "slotName": "Muzzle" }],
            "weaponSlots": [
                { "weaponId": 1, "slotId": 5, "slotOrder": 1, "unlock": true },
                { "weaponId": 1, "slotId": 5, "slotOrder": 2, "unlock": false },
                { "weaponId": 2, "slotId": 5, "slotOrder": 1 }
            ],
            "slotAccessories": [],
            "accessoryDynamicSlots": [],
            "notes": "kept"
        });
        fs::write(&path, doc.to_string()).unwrap();

        assert_eq!(baseline(&path).unwrap(), (3, 1));

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["metadata"]["counts"]["weaponSlots"], 2);
        assert_eq!(written["metadata"]["source"], "export");
        assert_eq!(written["weaponSlots"].as_array().unwrap().len(), 2);
        assert_eq!(written["slotTypes"][0]["slotId"], 5);
        assert_eq!(written["notes"], "kept");

        // Already baselined
        assert_eq!(baseline(&path).unwrap(), (2, 0));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(baseline(&temp_dir.path().join("slot_system.json")).is_err());
    }
}
