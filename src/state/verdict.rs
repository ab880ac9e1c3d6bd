//! Page verdict definitions produced by the validator

use std::fmt;

/// Why a request failed below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request or connection timed out
    Timeout,

    /// Connection refused, DNS failure or TLS handshake failure
    Connect,

    /// Redirect loop or too many redirects
    Redirect,

    /// The response body could not be read
    Body,

    /// Any other client error
    Other,
}

impl TransportErrorKind {
    /// Classifies a reqwest error
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else if error.is_redirect() {
            Self::Redirect
        } else if error.is_body() || error.is_decode() {
            Self::Body
        } else {
            Self::Other
        }
    }

    /// Returns true if the failure may clear up on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect | Self::Body)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The validator's classification of a fetched page
///
/// A page served with HTTP 200 may still be a soft "not found" page, so the
/// verdict never rests on the status code alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageVerdict {
    /// The page carries real content
    Valid,

    /// The server answered with a non-200 status
    HttpError(u16),

    /// The final URL after redirects points at an error page
    RedirectedToError,

    /// The page text contains an error phrase
    ContentIndicatesError,

    /// No HTTP response was received
    TransportFailure(TransportErrorKind),
}

impl PageVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns true if another attempt at the same URL may succeed
    ///
    /// Rate limiting (429), server errors (5xx) and transient transport
    /// failures qualify. Soft error pages and client errors do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportFailure(kind) => kind.is_transient(),
            Self::HttpError(code) => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

impl fmt::Display for PageVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::HttpError(code) => write!(f, "HTTP {}", code),
            Self::RedirectedToError => write!(f, "redirected to error page"),
            Self::ContentIndicatesError => write!(f, "page content indicates error"),
            Self::TransportFailure(kind) => write!(f, "transport failure ({})", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_verdicts() {
        assert!(PageVerdict::HttpError(429).is_retryable());
        assert!(PageVerdict::HttpError(503).is_retryable());
        assert!(PageVerdict::TransportFailure(TransportErrorKind::Timeout).is_retryable());
        assert!(PageVerdict::TransportFailure(TransportErrorKind::Connect).is_retryable());

        assert!(!PageVerdict::Valid.is_retryable());
        assert!(!PageVerdict::HttpError(404).is_retryable());
        assert!(!PageVerdict::RedirectedToError.is_retryable());
        assert!(!PageVerdict::ContentIndicatesError.is_retryable());
        assert!(!PageVerdict::TransportFailure(TransportErrorKind::Redirect).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(PageVerdict::HttpError(404).to_string(), "HTTP 404");
        assert_eq!(
            PageVerdict::TransportFailure(TransportErrorKind::Timeout).to_string(),
            "transport failure (timeout)"
        );
    }
}
