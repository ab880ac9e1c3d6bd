//! Pipeline coordinator - per-URL processing and the batch worker pool
//!
//! This module ties the pipeline stages together:
//! - Validating the URL shape before any request is made
//! - Fetching with bounded re-attempts for transient failures
//! - Classifying the page and extracting its fields
//! - Running many URLs concurrently while a single consumer writes the stores

use crate::config::Config;
use crate::output::{OutcomeCounts, RunReport};
use crate::pipeline::backoff::Backoff;
use crate::pipeline::extractor::Extractor;
use crate::pipeline::fetcher::{FetchResult, Fetcher};
use crate::pipeline::headers::{HeaderProvider, RandomHeaders};
use crate::pipeline::validator::PageValidator;
use crate::sink::{CsvSink, RecordSink, SinkResult, StorePaths};
use crate::state::{FailureReason, Outcome};
use crate::url::ParsedUrl;
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::sync::Arc;
use std::time::Instant;

/// The fetch → validate → extract pipeline for one configuration snapshot
pub struct Pipeline {
    config: Arc<Config>,
    fetcher: Fetcher,
    validator: PageValidator,
    extractor: Extractor,
    backoff: Backoff,
}

impl Pipeline {
    /// Creates a pipeline that rotates headers from the configured pool
    pub fn new(config: Arc<Config>) -> Result<Self, HarvestError> {
        let headers = Arc::new(RandomHeaders::new(&config.headers));
        Self::with_headers(config, headers)
    }

    /// Creates a pipeline with a caller-supplied header provider
    pub fn with_headers(
        config: Arc<Config>,
        headers: Arc<dyn HeaderProvider>,
    ) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.fetcher, headers)?;
        let validator = PageValidator::new(&config.validator);
        let extractor = Extractor::new(&config.extract)?;
        let backoff = Backoff::new(&config.fetcher);

        Ok(Self {
            config,
            fetcher,
            validator,
            extractor,
            backoff,
        })
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn validator(&self) -> &PageValidator {
        &self.validator
    }

    /// Header of the record store this pipeline writes
    pub fn header(&self) -> Vec<String> {
        self.extractor.header()
    }

    /// Processes a single URL into exactly one outcome
    ///
    /// This method:
    /// 1. Validates the URL shape (malformed URLs fail without a request)
    /// 2. Fetches the page, re-attempting retryable verdicts with backoff
    /// 3. Classifies the page
    /// 4. Skips void pages, extracts fields from the rest
    pub async fn process_url(&self, url: &str) -> Outcome {
        let parsed = match ParsedUrl::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Outcome::Failure {
                    url: url.to_string(),
                    reason: FailureReason::Extraction(e),
                }
            }
        };

        let max_attempts = self.config.fetcher.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let fetch = self.fetcher.fetch(url).await;

            match self.validator.precheck(&fetch) {
                Some(verdict) if verdict.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff.delay(attempt);
                    tracing::debug!(
                        "Attempt {}/{} for {} gave {}, retrying in {:?}",
                        attempt,
                        max_attempts,
                        url,
                        verdict,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Some(verdict) => {
                    return Outcome::Failure {
                        url: url.to_string(),
                        reason: FailureReason::Page(verdict),
                    }
                }
                None => return self.inspect(&fetch, parsed),
            }
        }
    }

    /// Classifies the body of a page that passed the cheap checks and extracts it
    ///
    /// The document is parsed once and dropped before returning, so no parsed
    /// tree is held across an await point.
    fn inspect(&self, fetch: &FetchResult, parsed: ParsedUrl) -> Outcome {
        let document = Html::parse_document(&String::from_utf8_lossy(&fetch.body));

        let verdict = self.validator.check_document(&document);
        if !verdict.is_valid() {
            return Outcome::Failure {
                url: parsed.url().to_string(),
                reason: FailureReason::Page(verdict),
            };
        }

        if let Some(marker) = self.extractor.void_marker(&document) {
            return Outcome::Skip {
                url: parsed.url().to_string(),
                reason: format!("void marker '{}'", marker),
            };
        }

        Outcome::Success(self.extractor.extract_parsed(&document, parsed))
    }

    /// Runs a batch of URLs through the pipeline into a sink
    ///
    /// Up to `concurrency` URLs are in flight at once. Outcomes are consumed
    /// here, one at a time, so this loop is the only writer of the sink and
    /// rows never interleave. Output order follows completion order.
    ///
    /// A sink error aborts the batch: the stores could no longer account for
    /// every URL.
    pub async fn run<S: RecordSink>(&self, urls: &[String], sink: &mut S) -> SinkResult<OutcomeCounts> {
        let total = urls.len();
        let concurrency = self.config.fetcher.concurrency.max(1);
        let mut counts = OutcomeCounts::default();

        tracing::info!("Processing {} URLs with {} workers", total, concurrency);

        let mut outcomes = stream::iter(urls)
            .map(|url| self.process_url(url))
            .buffer_unordered(concurrency);

        while let Some(outcome) = outcomes.next().await {
            let n = counts.attempted + 1;
            let label = outcome.label();

            match &outcome {
                Outcome::Success(record) => {
                    sink.write_record(record)?;
                    tracing::info!("[{}/{}] {} {}", n, total, label, record.url());
                }
                Outcome::Failure { url, reason } => {
                    sink.write_failure(url)?;
                    tracing::warn!("[{}/{}] {} {}: {}", n, total, label, url, reason);
                }
                Outcome::Skip { url, reason } => {
                    tracing::info!("[{}/{}] {} {}: {}", n, total, label, url, reason);
                }
            }

            counts.record(&outcome);
        }

        sink.flush()?;
        Ok(counts)
    }

    /// Opens fresh stores at `paths` and runs the batch into them
    pub async fn run_to_stores(
        &self,
        urls: &[String],
        paths: &StorePaths,
    ) -> Result<RunReport, HarvestError> {
        let start = Instant::now();
        let mut sink = CsvSink::open(paths, &self.header())?;

        let counts = self.run(urls, &mut sink).await?;
        sink.finish()?;

        Ok(RunReport {
            counts,
            records_path: paths.records.clone(),
            failures_path: paths.failures.clone(),
            elapsed: start.elapsed(),
        })
    }
}
