//! Image fetch pipeline.
//!
//! Jobs come from catalog picture URLs. A fixed-size worker pool fetches
//! them through an [`ImageSource`]; each job skips if its file exists,
//! retries in a bounded loop, and records its own outcome. One failed job
//! never stops the others.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::catalog::Catalog;
use crate::documents::timestamp;
use crate::error::{FetchError, Result};
use crate::model::{Category, InternalId, ObjectId};

const DEFAULT_EXTENSION: &str = ".png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    Main,
    Preview,
}

/// One picture to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub object_id: ObjectId,
    pub internal_id: InternalId,
    pub name: String,
    pub category: Category,
    pub url: String,
    pub variant: ImageVariant,
}

impl ImageJob {
    /// Index key: the object id, with `_preview` for preview pictures
    pub fn key(&self) -> String {
        match self.variant {
            ImageVariant::Main => self.object_id.to_string(),
            ImageVariant::Preview => format!("{}_preview", self.object_id),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.key(), url_extension(&self.url))
    }

    /// Path relative to the images root, always `/`-separated
    pub fn local_path(&self) -> String {
        format!("{}/{}", self.category.plural(), self.file_name())
    }

    pub fn target(&self, root: &Path) -> PathBuf {
        root.join(self.category.plural()).join(self.file_name())
    }
}

/// Extension of the URL path including the dot, `.png` when there is none
pub fn url_extension(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .and_then(|e| e.to_str())
                .filter(|e| !e.is_empty())
                .map(|e| format!(".{}", e))
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Jobs for every catalog entry with a picture, plus preview pictures
pub fn image_jobs(catalog: &Catalog) -> Vec<ImageJob> {
    let mut jobs = Vec::new();

    for entry in catalog.entries() {
        let pictures = [
            (ImageVariant::Main, entry.common.picture.as_deref()),
            (ImageVariant::Preview, entry.common.pre_picture.as_deref()),
        ];
        for (variant, url) in pictures {
            let Some(url) = url.filter(|u| !u.is_empty()) else {
                continue;
            };
            jobs.push(ImageJob {
                object_id: entry.object_id,
                internal_id: entry.id,
                name: entry.common.object_name.clone(),
                category: entry.category,
                url: url.to_string(),
                variant,
            });
        }
    }

    jobs
}

/// Where image bytes come from
pub trait ImageSource: Sync {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub workers: usize,
    /// Extra attempts after the first one
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Downloaded,
    SkippedExists,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub job: ImageJob,
    pub status: FetchStatus,
    pub attempts: u32,
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, FetchStatus::Failed(_))
    }
}

fn store(path: &Path, bytes: &[u8]) -> std::result::Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Fetch one job: skip if present, otherwise up to `retries + 1` attempts.
pub fn fetch_one(
    source: &dyn ImageSource,
    job: ImageJob,
    root: &Path,
    options: &FetchOptions,
) -> FetchOutcome {
    let path = job.target(root);
    if path.exists() {
        return FetchOutcome {
            job,
            status: FetchStatus::SkippedExists,
            attempts: 0,
        };
    }

    let max_attempts = options.retries + 1;
    let mut attempts = 0;
    let mut last_error = String::new();

    while attempts < max_attempts {
        attempts += 1;
        match source.fetch(&job.url).and_then(|bytes| store(&path, &bytes)) {
            Ok(()) => {
                return FetchOutcome {
                    job,
                    status: FetchStatus::Downloaded,
                    attempts,
                }
            }
            Err(e) => {
                tracing::debug!(
                    "Attempt {}/{} for {} failed: {}",
                    attempts,
                    max_attempts,
                    job.url,
                    e
                );
                last_error = e.to_string();
            }
        }
        if attempts < max_attempts && !options.retry_delay.is_zero() {
            thread::sleep(options.retry_delay);
        }
    }

    tracing::warn!("Failed to fetch {} ({}): {}", job.name, job.url, last_error);
    FetchOutcome {
        job,
        status: FetchStatus::Failed(last_error),
        attempts,
    }
}

/// Run every job on a pool of `options.workers` threads.
///
/// `on_complete` sees outcomes in completion order; the returned vector
/// is in job order.
pub fn fetch_all<F>(
    source: &dyn ImageSource,
    jobs: Vec<ImageJob>,
    root: &Path,
    options: &FetchOptions,
    on_complete: F,
) -> Result<Vec<FetchOutcome>>
where
    F: Fn(&FetchOutcome) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()?;

    let outcomes: Vec<FetchOutcome> = pool.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                let outcome = fetch_one(source, job, root, options);
                on_complete(&outcome);
                outcome
            })
            .collect()
    });

    Ok(outcomes)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndexMetadata {
    pub total: usize,
    /// Fetched now or already on disk
    pub downloaded: usize,
    pub failed: usize,
    pub categories: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndexEntry {
    pub id: InternalId,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    pub name: String,
    pub category: Category,
    pub variant: ImageVariant,
    pub url: String,
    pub local_path: String,
    pub exists: bool,
}

/// `image_index.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageIndexDocument {
    pub metadata: ImageIndexMetadata,
    pub images: BTreeMap<String, ImageIndexEntry>,
}

impl ImageIndexDocument {
    /// Build the index from outcomes. `exists` reflects the file on disk
    /// under `root` at build time.
    pub fn build(outcomes: &[FetchOutcome], root: &Path, at: DateTime<Utc>) -> Self {
        let mut doc = Self::default();
        doc.metadata.total = outcomes.len();
        doc.metadata.export_time = Some(timestamp(at));

        for outcome in outcomes {
            let job = &outcome.job;
            if outcome.is_failed() {
                doc.metadata.failed += 1;
            } else {
                doc.metadata.downloaded += 1;
            }
            *doc
                .metadata
                .categories
                .entry(job.category.to_string())
                .or_insert(0) += 1;

            doc.images.insert(
                job.key(),
                ImageIndexEntry {
                    id: job.internal_id,
                    object_id: job.object_id,
                    name: job.name.clone(),
                    category: job.category,
                    variant: job.variant,
                    url: job.url.clone(),
                    local_path: job.local_path(),
                    exists: job.target(root).exists(),
                },
            );
        }

        doc
    }
}

/// A row of `failed_downloads.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDownload {
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    pub name: String,
    pub url: String,
    pub error: String,
}

pub fn failed_downloads(outcomes: &[FetchOutcome]) -> Vec<FailedDownload> {
    outcomes
        .iter()
        .filter_map(|o| match &o.status {
            FetchStatus::Failed(error) => Some(FailedDownload {
                object_id: o.job.object_id,
                name: o.job.name.clone(),
                url: o.job.url.clone(),
                error: error.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Expected vs. present files for one category folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryProgress {
    pub category: Category,
    pub expected: usize,
    pub present: usize,
}

impl CategoryProgress {
    pub fn percent(&self) -> f64 {
        if self.expected == 0 {
            return 100.0;
        }
        self.present as f64 * 100.0 / self.expected as f64
    }
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .count()
        })
        .unwrap_or(0)
}

/// Compare expected job counts against the files in each category folder.
/// Categories with nothing expected are left out.
pub fn download_status(jobs: &[ImageJob], root: &Path) -> Vec<CategoryProgress> {
    let mut expected: BTreeMap<Category, usize> = BTreeMap::new();
    for job in jobs {
        *expected.entry(job.category).or_insert(0) += 1;
    }

    expected
        .into_iter()
        .map(|(category, expected)| CategoryProgress {
            category,
            expected,
            present: count_files(&root.join(category.plural())),
        })
        .collect()
}
