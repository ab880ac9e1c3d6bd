//! Sink module for persisting pipeline outcomes
//!
//! This module handles the two append-only stores every run produces:
//! - The record store: one CSV row per successfully extracted page
//! - The failure store: one URL per line for pages that did not yield a record
//!
//! Both stores get their header before any data row, and every row is flushed
//! as it is written so an interrupted run leaves only complete rows behind.

mod csv_sink;
mod traits;

pub use csv_sink::{read_failure_store, read_record_store, CsvSink, FAILURE_HEADER};
pub use traits::{RecordSink, SinkError, SinkResult};

use std::path::{Path, PathBuf};

/// Locations of the record and failure stores for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub records: PathBuf,
    pub failures: PathBuf,
}

impl StorePaths {
    /// Layout used by a scrape run:
    /// `{dir}/{file_name}_extra.csv` and `{dir}/errors_{file_name}_extra.csv`
    pub fn for_scrape(dir: &Path, file_name: &str) -> Self {
        Self {
            records: dir.join(format!("{}_extra.csv", file_name)),
            failures: dir.join(format!("errors_{}_extra.csv", file_name)),
        }
    }

    /// Layout used by a retry pass: `retry_results.csv` and `retry_errors.csv`
    pub fn for_retry(dir: &Path) -> Self {
        Self {
            records: dir.join("retry_results.csv"),
            failures: dir.join("retry_errors.csv"),
        }
    }
}
