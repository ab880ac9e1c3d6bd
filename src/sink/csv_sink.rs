//! CSV implementation of the record and failure stores

use crate::pipeline::ExtractedRecord;
use crate::sink::traits::{RecordSink, SinkError, SinkResult};
use crate::sink::StorePaths;
use csv::{QuoteStyle, ReaderBuilder, Writer, WriterBuilder};
use std::fs::{self, File};
use std::path::Path;

/// Header line of every failure store
pub const FAILURE_HEADER: &str = "url";

/// Record and failure stores backed by CSV files
///
/// Opening a sink truncates both files and writes their headers. The files
/// are flushed after every row and again when the sink is dropped.
pub struct CsvSink {
    records: Writer<File>,
    failures: Writer<File>,
    columns: usize,
}

impl CsvSink {
    /// Creates both stores (and their directories) and writes the headers
    ///
    /// The record header is written bare and every record field is quoted;
    /// failure lines are written unquoted.
    pub fn open(paths: &StorePaths, header: &[String]) -> SinkResult<Self> {
        create_parent(&paths.records)?;
        create_parent(&paths.failures)?;

        let mut header_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .from_path(&paths.records)?;
        header_writer.write_record(header)?;
        header_writer.flush()?;
        let file = header_writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))?;

        let records = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);

        let mut failures = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_path(&paths.failures)?;
        failures.write_record([FAILURE_HEADER])?;
        failures.flush()?;

        tracing::debug!(
            "Opened stores {} and {}",
            paths.records.display(),
            paths.failures.display()
        );

        Ok(Self {
            records,
            failures,
            columns: header.len(),
        })
    }

    /// Flushes both stores and closes them
    pub fn finish(mut self) -> SinkResult<()> {
        self.flush()
    }
}

impl RecordSink for CsvSink {
    fn write_record(&mut self, record: &ExtractedRecord) -> SinkResult<()> {
        let row = record.to_row();
        if row.len() != self.columns {
            return Err(SinkError::ColumnMismatch {
                url: record.url().to_string(),
                expected: self.columns,
                found: row.len(),
            });
        }
        self.records.write_record(&row)?;
        self.records.flush()?;
        Ok(())
    }

    fn write_failure(&mut self, url: &str) -> SinkResult<()> {
        self.failures.write_record([url])?;
        self.failures.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.records.flush()?;
        self.failures.flush()?;
        Ok(())
    }
}

/// Creates the parent directory of a store if it does not exist yet
fn create_parent(path: &Path) -> SinkResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Reads the URLs of a failure store, skipping the header and blank lines
pub fn read_failure_store(path: &Path) -> SinkResult<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_path(path)?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Unquoted store: a URL containing a comma spans several fields
        let line = record.iter().collect::<Vec<_>>().join(",");
        let url = line.trim();
        if !url.is_empty() {
            urls.push(url.to_string());
        }
    }
    Ok(urls)
}

/// Reads a record store back as its header and rows
pub fn read_record_store(path: &Path) -> SinkResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let header = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
    Ok((header, rows))
}
