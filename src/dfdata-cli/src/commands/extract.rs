//! Catalog extraction command

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use dfdata::documents::{
    spec_file_name, CatalogDocument, LegacyIndexDocument, SlotSystemDocument, SpecDocument,
    CATALOG_FILE, INDEX_FILE, SLOT_SYSTEM_FILE,
};
use dfdata::index::{IndexCollision, LegacyIndex};
use dfdata::io::{read_json, StagedWrites};
use dfdata::{extract, Category, Extraction, ItemDump};
use std::path::{Path, PathBuf};

/// What an extraction produced besides the files
pub struct ExtractSummary {
    pub extraction: Extraction,
    pub index_collisions: Vec<IndexCollision>,
}

/// Split the export and write every document into `output`
pub fn run(input: &Path, output: &Path) -> Result<()> {
    let summary = run_at(input, output, Utc::now())?;
    print_summary(&summary, output);
    Ok(())
}

/// Same as [`run`] with a fixed export time. Nothing is written unless
/// every document serializes.
pub fn run_at(input: &Path, output: &Path, at: DateTime<Utc>) -> Result<ExtractSummary> {
    let dump: ItemDump = read_json(input)
        .with_context(|| format!("Failed to load item export {}", input.display()))?;
    let universe = dump.into_universe();
    tracing::info!("Loaded {} items from {}", universe.items.len(), input.display());

    let extraction = extract(&universe.items);

    let missing = extraction.missing_from_catalog(&universe.items);
    if !missing.is_empty() {
        bail!(
            "{} items have no catalog entry (first: {})",
            missing.len(),
            missing[0]
        );
    }

    let mut writes = StagedWrites::new();

    let catalog = CatalogDocument::new(extraction.catalog.clone(), universe.version.clone(), at);
    writes.stage(output.join(CATALOG_FILE), &catalog)?;

    for &category in extraction.shards.keys() {
        let categories = match category {
            Category::Weapon => Some(universe.weapon_categories.as_slice()),
            Category::Accessory => Some(universe.accessory_categories.as_slice()),
            _ => None,
        };
        let doc = SpecDocument::new(
            category,
            extraction.shard(category),
            categories,
            universe.version.clone(),
            at,
        );
        writes.stage(output.join(spec_file_name(category)), &doc)?;
    }

    let slots = SlotSystemDocument::new(universe.slots.clone(), universe.version.clone(), at);
    writes.stage(output.join(SLOT_SYSTEM_FILE), &slots)?;

    let index = LegacyIndex::build(&extraction.catalog);
    writes.stage(
        output.join(INDEX_FILE),
        &LegacyIndexDocument::new(&index, universe.version.clone(), at),
    )?;

    let written: Vec<PathBuf> = writes
        .commit()
        .with_context(|| format!("Failed to write documents to {}", output.display()))?;
    tracing::info!("Wrote {} documents to {}", written.len(), output.display());

    Ok(ExtractSummary {
        index_collisions: index.collisions,
        extraction,
    })
}

fn print_summary(summary: &ExtractSummary, output: &Path) {
    let extraction = &summary.extraction;
    println!("Catalog: {} entries", extraction.catalog.len());
    for (category, count) in extraction.breakdown() {
        println!("  {:<14} {}", category, count);
    }

    if !extraction.collisions.is_empty() {
        println!();
        println!("{} duplicate objectIDs (last record kept):", extraction.collisions.len());
        for collision in &extraction.collisions {
            println!("  {}", collision);
        }
    }

    if !summary.index_collisions.is_empty() {
        println!();
        println!(
            "{} duplicate internal ids in {} (last record kept):",
            summary.index_collisions.len(),
            INDEX_FILE
        );
        for collision in &summary.index_collisions {
            println!("  {}", collision);
        }
    }

    println!();
    println!("Output: {}", output.display());
}
