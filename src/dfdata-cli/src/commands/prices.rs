//! Price backfill command

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dfdata::documents::CatalogDocument;
use dfdata::io::{read_json, write_json};
use dfdata::prices::{backfill, load_price_records, BackfillReport, PriceSource};
use std::path::{Path, PathBuf};

const LIST_LIMIT: usize = 10;

/// What a backfill run did, plus the rewritten catalog
pub struct BackfillRun {
    pub report: BackfillReport,
    pub catalog: CatalogDocument,
    /// Source rows with no usable objectID or avgPrice, over all sources
    pub unreadable_rows: usize,
}

pub fn run(catalog_path: &Path, sources: &[PathBuf]) -> Result<()> {
    let BackfillRun {
        report,
        catalog,
        unreadable_rows,
    } = run_at(catalog_path, sources, Utc::now())?;

    println!("Total items:     {}", report.total);
    println!("Missing prices:  {}", report.missing);
    println!("Updated:         {}", report.updated);
    println!("Still missing:   {}", report.still_missing.len());
    if unreadable_rows > 0 {
        println!("Unreadable rows: {}", unreadable_rows);
    }

    for object_id in report.still_missing.iter().take(LIST_LIMIT) {
        let name = catalog
            .items
            .get(*object_id)
            .map(|e| e.common.object_name.as_str())
            .unwrap_or("?");
        println!("  {} {}", object_id, name);
    }
    if report.still_missing.len() > LIST_LIMIT {
        println!("  ... and {} more", report.still_missing.len() - LIST_LIMIT);
    }
    Ok(())
}

pub fn run_at(
    catalog_path: &Path,
    sources: &[PathBuf],
    at: DateTime<Utc>,
) -> Result<BackfillRun> {
    let mut catalog: CatalogDocument = read_json(catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;

    let mut prices = PriceSource::new();
    let mut unreadable_rows = 0;
    for source in sources {
        let rows = load_price_records(source)
            .with_context(|| format!("Failed to load price source {}", source.display()))?;
        tracing::info!("{}: {} price records", source.display(), rows.records.len());
        unreadable_rows += rows.skipped;
        prices.extend(rows.records);
    }

    let report = backfill(&mut catalog.items, &prices);
    catalog.refresh(at);

    write_json(catalog_path, &catalog)
        .with_context(|| format!("Failed to write catalog {}", catalog_path.display()))?;

    Ok(BackfillRun {
        report,
        catalog,
        unreadable_rows,
    })
}
