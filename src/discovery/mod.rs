//! URL discovery for scrape runs
//!
//! Two strategies produce result-page URLs upstream of the pipeline:
//! - By course and year: a JSON index lists every race a course ran that year
//! - By date: a daily results page links to each course's results
//!
//! Both return a sorted, deduplicated list in the site's canonical URL form.
//! An index that cannot be fetched or decoded is logged and skipped.

mod by_course;
mod by_date;

pub use by_course::{course_index_url, parse_course_index};
pub use by_date::{date_page_url, parse_date_page};

use crate::config::{compile_selector, SiteConfig};
use crate::pipeline::Fetcher;
use crate::request::{ScrapeRequest, Selection};
use crate::HarvestError;
use scraper::Selector;

/// Enumerates result-page URLs from the site's index pages
pub struct UrlDiscovery {
    fetcher: Fetcher,
    site: SiteConfig,
    date_link_selector: Selector,
}

impl UrlDiscovery {
    pub fn new(fetcher: Fetcher, site: SiteConfig) -> Result<Self, HarvestError> {
        let date_link_selector = compile_selector(&site.date_link_selector)?;
        Ok(Self {
            fetcher,
            site,
            date_link_selector,
        })
    }

    /// Discovers the URLs a scrape request covers
    pub async fn discover(&self, request: &ScrapeRequest) -> Vec<String> {
        let urls = match &request.selection {
            Selection::Courses { courses, years } => {
                self.by_course(courses, years, request.code.as_str()).await
            }
            Selection::Dates { dates, course_ids } => self.by_date(dates, course_ids).await,
        };
        tracing::info!("Discovered {} result URLs", urls.len());
        urls
    }
}
