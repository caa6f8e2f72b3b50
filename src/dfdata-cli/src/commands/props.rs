//! Props split command

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dfdata::documents::{spec_file_name, CatalogDocument, SpecDocument, CATALOG_FILE};
use dfdata::io::{read_json, StagedWrites};
use dfdata::props::{load_props, split_props, PropSplit};
use dfdata::{Category, CatalogEntry, Collision, ItemSpec};
use std::path::Path;

pub struct PropsSummary {
    pub split: PropSplit,
    pub collisions: Vec<Collision>,
    pub catalog_total: usize,
}

pub fn run(input: &Path, output: &Path) -> Result<()> {
    let summary = run_at(input, output, Utc::now())?;

    println!("Collectibles: {}", summary.split.collectibles.len());
    println!("Consumables:  {}", summary.split.consumables.len());
    println!("Ignored:      {}", summary.split.others);
    if !summary.collisions.is_empty() {
        println!("Replaced {} existing catalog entries", summary.collisions.len());
    }
    println!("Catalog now holds {} entries", summary.catalog_total);
    Ok(())
}

pub fn run_at(input: &Path, output: &Path, at: DateTime<Utc>) -> Result<PropsSummary> {
    let records = load_props(input)
        .with_context(|| format!("Failed to load prop export {}", input.display()))?;
    let split = split_props(records);

    let catalog_path = output.join(CATALOG_FILE);
    let mut catalog: CatalogDocument = if catalog_path.exists() {
        read_json(&catalog_path)
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?
    } else {
        tracing::info!("No catalog at {}, creating one", catalog_path.display());
        CatalogDocument::default()
    };

    let collisions = catalog
        .items
        .merge(split.items().map(CatalogEntry::from_item));
    catalog.refresh(at);

    let collectibles: Vec<ItemSpec> = split.collectibles.iter().map(|i| i.spec.clone()).collect();
    let consumables: Vec<ItemSpec> = split.consumables.iter().map(|i| i.spec.clone()).collect();
    let version = catalog.metadata.version.clone();

    let mut writes = StagedWrites::new();
    writes.stage(
        output.join(spec_file_name(Category::Collectible)),
        &SpecDocument::new(Category::Collectible, &collectibles, None, version.clone(), at),
    )?;
    writes.stage(
        output.join(spec_file_name(Category::Consumable)),
        &SpecDocument::new(Category::Consumable, &consumables, None, version, at),
    )?;
    writes.stage(catalog_path, &catalog)?;
    writes
        .commit()
        .with_context(|| format!("Failed to write documents to {}", output.display()))?;

    Ok(PropsSummary {
        catalog_total: catalog.items.len(),
        split,
        collisions,
    })
}
