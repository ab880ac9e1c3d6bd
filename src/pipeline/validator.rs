//! Page validation
//!
//! Decides whether a fetched page is real content. Checks run cheapest first:
//! transport failure, status code, final URL, and only then the page text.

use crate::config::ValidatorConfig;
use crate::pipeline::fetcher::FetchResult;
use crate::state::PageVerdict;
use scraper::Html;

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Classifies fetched pages against configured error indicators
#[derive(Debug, Clone)]
pub struct PageValidator {
    error_phrases: Vec<String>,
    error_url_fragments: Vec<String>,
}

impl PageValidator {
    /// Creates a validator; phrase and fragment matching is case-insensitive
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            error_phrases: config.error_phrases.iter().map(|p| p.to_lowercase()).collect(),
            error_url_fragments: config
                .error_url_fragments
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Classifies a fetch result
    ///
    /// # Classification Order
    ///
    /// 1. Transport error set → `TransportFailure`
    /// 2. Status other than 200 → `HttpError`
    /// 3. Final URL contains an error fragment → `RedirectedToError`
    /// 4. Visible page text contains an error phrase → `ContentIndicatesError`
    /// 5. Otherwise → `Valid`
    pub fn classify(&self, fetch: &FetchResult) -> PageVerdict {
        if let Some(verdict) = self.precheck(fetch) {
            return verdict;
        }
        let document = Html::parse_document(&String::from_utf8_lossy(&fetch.body));
        self.check_document(&document)
    }

    /// Runs the checks that do not need the body parsed (steps 1-3)
    ///
    /// Returns `None` when the page still has to be inspected.
    pub fn precheck(&self, fetch: &FetchResult) -> Option<PageVerdict> {
        if let Some(kind) = fetch.transport_error {
            return Some(PageVerdict::TransportFailure(kind));
        }

        if fetch.status_code != 200 {
            return Some(PageVerdict::HttpError(fetch.status_code));
        }

        let final_url = fetch.final_url.to_lowercase();
        if self
            .error_url_fragments
            .iter()
            .any(|fragment| final_url.contains(fragment.as_str()))
        {
            return Some(PageVerdict::RedirectedToError);
        }

        None
    }

    /// Scans the visible text of a parsed page for error phrases (steps 4-5)
    pub fn check_document(&self, document: &Html) -> PageVerdict {
        let text = visible_text(document).to_lowercase();
        if self
            .error_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
        {
            PageVerdict::ContentIndicatesError
        } else {
            PageVerdict::Valid
        }
    }
}

/// Collects the rendered text of a document with whitespace collapsed
pub fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
