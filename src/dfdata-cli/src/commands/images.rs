//! Picture download and status commands

use crate::http::HttpImageSource;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dfdata::documents::{CatalogDocument, FAILED_DOWNLOADS_FILE, IMAGE_INDEX_FILE};
use dfdata::images::{
    download_status, failed_downloads, fetch_all, image_jobs, FetchOptions, FetchOutcome,
    FetchStatus, ImageIndexDocument, ImageJob, ImageSource,
};
use dfdata::io::{read_json, write_json};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

fn load_jobs(catalog_path: &Path) -> Result<Vec<ImageJob>> {
    let catalog: CatalogDocument = read_json(catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
    Ok(image_jobs(&catalog.items))
}

/// Fetch every job and write the image index (plus the failure list when
/// anything failed) into `root`.
pub fn download_with(
    source: &dyn ImageSource,
    jobs: Vec<ImageJob>,
    root: &Path,
    options: &FetchOptions,
    at: DateTime<Utc>,
    on_complete: impl Fn(&FetchOutcome) + Sync,
) -> Result<Vec<FetchOutcome>> {
    let outcomes = fetch_all(source, jobs, root, options, on_complete)?;

    let index = ImageIndexDocument::build(&outcomes, root, at);
    write_json(&root.join(IMAGE_INDEX_FILE), &index).context("Failed to write image index")?;

    let failed = failed_downloads(&outcomes);
    if !failed.is_empty() {
        write_json(&root.join(FAILED_DOWNLOADS_FILE), &failed)
            .context("Failed to write failed download list")?;
    }

    Ok(outcomes)
}

pub fn download(
    catalog_path: &Path,
    root: &Path,
    options: &FetchOptions,
    timeout: Duration,
) -> Result<()> {
    let jobs = load_jobs(catalog_path)?;
    println!(
        "Fetching {} pictures into {} ({} workers)",
        jobs.len(),
        root.display(),
        options.workers
    );

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let source = HttpImageSource::new(timeout);
    let outcomes = download_with(&source, jobs, root, options, Utc::now(), |outcome| {
        if outcome.is_failed() {
            pb.set_message(format!("failed: {}", outcome.job.name));
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    let mut downloaded = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for outcome in &outcomes {
        match outcome.status {
            FetchStatus::Downloaded => downloaded += 1,
            FetchStatus::SkippedExists => skipped += 1,
            FetchStatus::Failed(_) => failed += 1,
        }
    }

    println!("Downloaded: {}", downloaded);
    println!("Skipped:    {} (already present)", skipped);
    println!("Failed:     {}", failed);
    if failed > 0 {
        println!("See {}", root.join(FAILED_DOWNLOADS_FILE).display());
    }
    Ok(())
}

pub fn status(catalog_path: &Path, root: &Path) -> Result<()> {
    let jobs = load_jobs(catalog_path)?;

    println!("{:<14} {:>8} {:>8} {:>7}", "Category", "Expected", "Present", "Done");
    println!("{}", "-".repeat(40));
    for row in download_status(&jobs, root) {
        println!(
            "{:<14} {:>8} {:>8} {:>6.1}%",
            row.category.plural(),
            row.expected,
            row.present,
            row.percent()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dfdata::FetchError;
    use serde_json::{json, Value};
    use std::fs;

    struct StaticSource;

    impl ImageSource for StaticSource {
        fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
            if url.contains("missing") {
                Err(FetchError::Status(404))
            } else {
                Ok(b"png".to_vec())
            }
        }
    }

    #[test]
    fn test_download_writes_index_and_failures() {
        let temp_dir = tempfile::tempdir().unwrap();
        let catalog_path = temp_dir.path().join("items_catalog.json");
        let catalog = json!({
            "metadata": {},
            "items": {
                "100": { "id": 1, "objectID": 100, "category": "weapon", "objectName": "M4A1",
                         "picture": "https://img.example.com/m4a1.jpg" },
                "200": { "id": 2, "objectID": 200, "category": "accessory", "objectName": "Grip",
                         "picture": "https://img.example.com/missing.png" },
                "300": { "id": 3, "objectID": 300, "category": "accessory", "objectName": "Bare" }
            }
        });
        fs::write(&catalog_path, catalog.to_string()).unwrap();
        let root = temp_dir.path().join("images");

        let options = FetchOptions {
            workers: 2,
            retries: 1,
            retry_delay: Duration::ZERO,
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let jobs = load_jobs(&catalog_path).unwrap();
        assert_eq!(jobs.len(), 2);

        let outcomes = download_with(&StaticSource, jobs, &root, &options, at, |_| {}).unwrap();
        assert_eq!(outcomes.iter().filter(|o| o.is_failed()).count(), 1);
        assert!(root.join("weapons/100.jpg").exists());

        let failed: Value =
            serde_json::from_str(&fs::read_to_string(root.join(FAILED_DOWNLOADS_FILE)).unwrap())
                .unwrap();
        assert_eq!(failed.as_array().unwrap().len(), 1);
        assert!(root.join(IMAGE_INDEX_FILE).exists());

        let progress = download_status(&load_jobs(&catalog_path).unwrap(), &root);
        let weapons = progress.iter().find(|p| p.category.plural() == "weapons").unwrap();
        assert_eq!((weapons.expected, weapons.present), (1, 1));
    }
}
