//! Relation analysis command

use super::{header, print_distribution, print_summary};
use anyhow::{Context, Result};
use dfdata::analysis::{relations_report, RelationsReport};
use dfdata::io::read_json;
use dfdata::ItemDump;
use std::path::Path;

pub fn run(input: &Path) -> Result<()> {
    let dump: ItemDump = read_json(input)
        .with_context(|| format!("Failed to load item export {}", input.display()))?;
    let universe = dump.into_universe();

    print_report(&relations_report(&universe));
    Ok(())
}

fn print_report(report: &RelationsReport) {
    header("Most customizable weapons");
    println!("{:<14} {:<28} {:>11} {:>6}", "objectID", "Name", "Accessories", "Slots");
    println!("{}", "-".repeat(62));
    for w in &report.top_weapons {
        println!("{:<14} {:<28} {:>11} {:>6}", w.object_id, w.name, w.accessories, w.slots);
    }

    header("Accessory type usage");
    print_distribution(&report.accessory_type_usage);

    header("Dynamic slot rules");
    println!("Accessories that add slots:    {}", report.adding_accessories);
    println!("Accessories that remove slots: {}", report.removing_accessories);
    println!();
    if report.complex_accessories.is_empty() {
        println!("  no accessory changes more than one slot");
    }
    for a in &report.complex_accessories {
        println!(
            "  {:<28} {:<12} +{} -{}",
            a.name, a.accessory_type, a.adds, a.removes
        );
    }

    header("Slot type usage");
    for usage in &report.slot_type_usage {
        println!("  {:<10} {:<24} {:>6}", usage.slot_id.to_string(), usage.name, usage.uses);
    }

    header("Capacity by weapon type");
    println!("{:<16} {:>8} {:>10} {:>16}", "Type", "Weapons", "Avg slots", "Avg accessories");
    for t in &report.weapon_types {
        println!(
            "{:<16} {:>8} {:>10.1} {:>16.1}",
            t.weapon_type, t.weapons, t.avg_slots, t.avg_accessories
        );
    }

    header("Calibers");
    println!("{:<16} {:>13} {:>8}", "Caliber", "Ammo variants", "Weapons");
    for c in &report.calibers {
        println!("{:<16} {:>13} {:>8}", c.caliber, c.ammo_variants, c.weapons);
    }

    header("Price by grade");
    for g in &report.grade_prices {
        print_summary(&format!("Grade {}", g.grade), Some(&g.summary));
    }

    if report.orphans.total() > 0 {
        header("Orphaned relations");
        println!("Slots on unknown weapons:     {}", report.orphans.unknown_weapon);
        println!("Slots of unknown slot types:  {}", report.orphans.unknown_slot_type);
    }
}
