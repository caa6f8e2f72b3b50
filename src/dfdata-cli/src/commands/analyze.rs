//! Descriptive statistics command

use super::{header, print_distribution, print_summary, section};
use anyhow::{Context, Result};
use dfdata::analysis::{item_report, ItemReport};
use dfdata::io::read_json;
use dfdata::ItemDump;
use std::path::Path;

pub fn run(input: &Path) -> Result<()> {
    let dump: ItemDump = read_json(input)
        .with_context(|| format!("Failed to load item export {}", input.display()))?;
    let universe = dump.into_universe();

    print_report(&item_report(&universe));
    Ok(())
}

fn print_nulls(label: &str, nulls: &[(String, usize)]) {
    println!("  {}:", label);
    if nulls.is_empty() {
        println!("    none");
    }
    for (field, count) in nulls {
        println!("    {:<24} {}", field, count);
    }
}

fn print_report(report: &ItemReport) {
    let w = &report.weapons;
    header(&format!("Weapons ({})", w.count));
    section("Type");
    print_distribution(&w.types);
    section("Caliber");
    print_distribution(&w.calibers);
    section("Fire mode");
    print_distribution(&w.fire_modes);
    section("Grade");
    print_distribution(&w.grades);
    section("Numbers");
    print_summary("Price", w.price.as_ref());
    for (name, summary) in &w.parameters {
        print_summary(name, summary.as_ref());
    }
    print_summary("Weight", w.weight.as_ref());
    print_summary("Width", w.width.as_ref());
    print_summary("Height", w.height.as_ref());

    let a = &report.accessories;
    header(&format!("Accessories ({})", a.count));
    section("Type");
    print_distribution(&a.types);
    section("Grade");
    print_distribution(&a.grades);
    section("Numbers");
    print_summary("Price", a.price.as_ref());
    println!("  Quick-separate: {}", a.quick_separate);

    let ammo = &report.ammunition;
    header(&format!("Ammunition ({})", ammo.count));
    section("Caliber");
    print_distribution(&ammo.calibers);
    section("Penetration level");
    print_distribution(&ammo.penetration_levels);
    section("Armor damage level");
    print_distribution(&ammo.armor_harm_levels);
    section("Numbers");
    print_summary("Harm ratio", ammo.harm_ratio.as_ref());

    let p = &report.protection;
    header("Protective gear");
    println!(
        "Helmets: {}  Armors: {}  Chests: {}  Backpacks: {}",
        p.helmets, p.armors, p.chests, p.backpacks
    );
    section("Helmet protection level");
    print_distribution(&p.helmet_levels);
    section("Armor protection level");
    print_distribution(&p.armor_levels);

    let s = &report.slots;
    header("Slot system");
    println!("Slot types:           {}", s.counts.slot_types);
    println!("Weapon slots:         {}", s.counts.weapon_slots);
    println!("Slot compatibilities: {}", s.counts.slot_accessories);
    println!("Dynamic slot rules:   {}", s.counts.dynamic_slots);
    section("Dynamic action");
    print_distribution(&s.actions);
    section("Numbers");
    print_summary("Slots per weapon", s.slots_per_weapon.as_ref());
    print_summary("Slot types per accessory", s.slots_per_accessory.as_ref());

    let q = &report.quality;
    header("Data quality");
    print_nulls("Weapon null fields", &q.weapon_nulls);
    print_nulls("Accessory null fields", &q.accessory_nulls);
    println!("  Market-banned weapons:     {}", q.banned_weapons);
    println!("  Market-banned accessories: {}", q.banned_accessories);
}
