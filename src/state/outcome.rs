use crate::pipeline::ExtractedRecord;
use crate::state::PageVerdict;
use crate::ShapeError;
use std::fmt;

/// Why a URL ended up in the failure store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The page was fetched (or not) and judged unusable
    Page(PageVerdict),

    /// The URL does not follow the result-page shape
    Extraction(ShapeError),
}

impl FailureReason {
    /// Stable name of the failure category, used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Page(PageVerdict::TransportFailure(_)) => "transport_failure",
            Self::Page(PageVerdict::HttpError(_)) => "http_error",
            Self::Page(PageVerdict::RedirectedToError) => "redirected_to_error",
            Self::Page(PageVerdict::ContentIndicatesError) => "content_indicates_error",
            // A valid verdict never becomes a failure
            Self::Page(PageVerdict::Valid) => "valid",
            Self::Extraction(_) => "extraction_error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(verdict) => write!(f, "{}", verdict),
            Self::Extraction(e) => write!(f, "extraction failed: {}", e),
        }
    }
}

/// The one result every input URL produces
///
/// `Success` appends one row to the record store, `Failure` appends one line
/// to the failure store, `Skip` writes to neither. Skips are pages that loaded
/// fine but carry a void marker; they must not enter the retry queue.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success(ExtractedRecord),
    Failure { url: String, reason: FailureReason },
    Skip { url: String, reason: String },
}

impl Outcome {
    /// The input URL this outcome belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Success(record) => record.url(),
            Self::Failure { url, .. } | Self::Skip { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }

    /// Short label used in progress logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "ok",
            Self::Failure { .. } => "failed",
            Self::Skip { .. } => "skipped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::ParsedUrl;

    const URL: &str = "https://example.com/results/11/ascot/2024-06-18/1";

    #[test]
    fn test_labels() {
        let success = Outcome::Success(ExtractedRecord::new(ParsedUrl::parse(URL).unwrap(), vec![]));
        let failure = Outcome::Failure {
            url: URL.to_string(),
            reason: FailureReason::Page(PageVerdict::HttpError(404)),
        };
        let skip = Outcome::Skip {
            url: URL.to_string(),
            reason: "void".to_string(),
        };

        assert_eq!(success.label(), "ok");
        assert_eq!(failure.label(), "failed");
        assert_eq!(skip.label(), "skipped");
        assert!([&success, &failure, &skip].iter().all(|o| o.url() == URL));
    }

    #[test]
    fn test_failure_kinds() {
        let reason = FailureReason::Page(PageVerdict::RedirectedToError);
        assert_eq!(reason.kind(), "redirected_to_error");
    }
}
