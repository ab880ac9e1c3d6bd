//! Sink traits and error types

use crate::pipeline::ExtractedRecord;
use thiserror::Error;

/// Errors that can occur while writing or reading stores
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row for {url} has {found} columns, header has {expected}")]
    ColumnMismatch {
        url: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for pipeline outcomes
///
/// Each call appends exactly one complete row. Implementations must not be
/// shared between writers without serializing access.
pub trait RecordSink {
    /// Appends one extracted record to the record store
    fn write_record(&mut self, record: &ExtractedRecord) -> SinkResult<()>;

    /// Appends one URL to the failure store
    fn write_failure(&mut self, url: &str) -> SinkResult<()>;

    /// Flushes both stores
    fn flush(&mut self) -> SinkResult<()>;
}
