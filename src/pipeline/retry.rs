//! Retry passes over failure stores
//!
//! A retry pass is not a separate algorithm: the URLs collected from one or
//! more failure stores go through the same pipeline and land in a fresh pair
//! of stores. The old failure stores are never modified.

use crate::output::RunReport;
use crate::pipeline::coordinator::Pipeline;
use crate::sink::{read_failure_store, SinkResult, StorePaths};
use crate::HarvestError;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns true for file names written by a scrape run's failure store
pub fn is_failure_store_name(name: &str) -> bool {
    name.starts_with("errors_") && name.ends_with(".csv")
}

/// Recursively finds failure stores (`errors_*.csv`) under a directory
///
/// Results are sorted so repeated runs visit stores in the same order.
pub fn find_failure_stores(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .map_or(false, is_failure_store_name)
        {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

/// Expands retry sources: files are taken as given, directories are searched
pub fn expand_failure_sources(sources: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut stores = Vec::new();
    for source in sources {
        if source.is_dir() {
            stores.extend(find_failure_stores(source)?);
        } else {
            stores.push(source.clone());
        }
    }
    Ok(stores)
}

/// Loads every URL from the given failure stores
///
/// The same URL may have failed in several independent runs; it appears once
/// in the result.
pub fn collect_failures(paths: &[PathBuf]) -> SinkResult<BTreeSet<String>> {
    let mut urls = BTreeSet::new();
    for path in paths {
        let store_urls = read_failure_store(path)?;
        tracing::debug!("{} URLs in {}", store_urls.len(), path.display());
        urls.extend(store_urls);
    }
    Ok(urls)
}

/// Re-runs failed URLs through a pipeline
pub struct RetryCoordinator<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> RetryCoordinator<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// Retries `urls`, writing `retry_results.csv` and `retry_errors.csv`
    /// into `output_dir`
    pub async fn retry(
        &self,
        urls: &BTreeSet<String>,
        output_dir: &Path,
    ) -> Result<RunReport, HarvestError> {
        let urls: Vec<String> = urls.iter().cloned().collect();
        let paths = StorePaths::for_retry(output_dir);

        tracing::info!(
            "Retrying {} URLs into {}",
            urls.len(),
            output_dir.display()
        );

        self.pipeline.run_to_stores(&urls, &paths).await
    }

    /// Collects failures from `sources` (files or directories) and retries them
    pub async fn retry_sources(
        &self,
        sources: &[PathBuf],
        output_dir: &Path,
    ) -> Result<RunReport, HarvestError> {
        let stores = expand_failure_sources(sources)?;
        if stores.is_empty() {
            tracing::warn!("No failure stores found");
        }
        for store in &stores {
            tracing::info!("Failure store: {}", store.display());
        }

        let urls = collect_failures(&stores)?;
        self.retry(&urls, output_dir).await
    }
}
