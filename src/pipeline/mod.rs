//! Pipeline module for fetching, classifying and extracting result pages
//!
//! This module contains the per-URL pipeline and its batch drivers:
//! - HTTP fetching with rotated request headers
//! - Page validation (hard and soft error detection)
//! - Declarative field extraction
//! - The bounded worker pool feeding the record and failure stores
//! - Retry passes over failure stores

mod backoff;
mod coordinator;
mod extractor;
mod fetcher;
mod headers;
mod retry;
mod validator;

pub use backoff::Backoff;
pub use coordinator::Pipeline;
pub use extractor::{ExtractedRecord, Extractor};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use headers::{HeaderProvider, RandomHeaders};
pub use retry::{
    collect_failures, expand_failure_sources, find_failure_stores, is_failure_store_name,
    RetryCoordinator,
};
pub use validator::{visible_text, PageValidator};

use crate::config::Config;
use crate::output::RunReport;
use crate::sink::StorePaths;
use crate::HarvestError;
use std::sync::Arc;

/// Runs a batch of URLs into fresh stores
///
/// This is the main entry point for a scrape run. It will:
/// 1. Build the pipeline from the configuration snapshot
/// 2. Create both stores and write their headers
/// 3. Process every URL into exactly one outcome
/// 4. Report the counts and store locations
pub async fn scrape(
    config: Arc<Config>,
    urls: &[String],
    paths: &StorePaths,
) -> Result<RunReport, HarvestError> {
    let pipeline = Pipeline::new(config)?;
    pipeline.run_to_stores(urls, paths).await
}
