//! Discovery by date

use crate::discovery::UrlDiscovery;
use crate::url::canonicalize_url;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};

/// Daily results page for one date
pub fn date_page_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/results/{}",
        base_url.trim_end_matches('/'),
        date.format("%Y-%m-%d")
    )
}

/// Extracts course-result URLs from a daily results page
///
/// Only links whose course-id segment (`/results/{course_id}/...`) is in
/// `course_ids` are kept. Links are made absolute against `base_url`.
pub fn parse_date_page(
    html: &str,
    selector: &Selector,
    course_ids: &HashSet<String>,
    base_url: &str,
) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = base_url.trim_end_matches('/');

    document
        .select(selector)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| {
            let href = href.trim();
            let path = href.strip_prefix(base).unwrap_or(href);
            if !path.starts_with('/') {
                return None;
            }
            let course_id = path.split('/').nth(2)?;
            if course_ids.contains(course_id) {
                Some(canonicalize_url(&format!("{}{}", base, path)))
            } else {
                None
            }
        })
        .collect()
}

impl UrlDiscovery {
    /// Discovers result URLs for every date, limited to the given courses
    pub async fn by_date(&self, dates: &[NaiveDate], course_ids: &HashSet<String>) -> Vec<String> {
        let mut urls = BTreeSet::new();

        for &date in dates {
            let page_url = date_page_url(&self.site.base_url, date);
            tracing::debug!("Fetching results index {}", page_url);

            match self.fetcher.fetch_text(&page_url).await {
                Ok(body) => {
                    let found = parse_date_page(
                        &body,
                        &self.date_link_selector,
                        course_ids,
                        &self.site.base_url,
                    );
                    tracing::info!("{}: {} races", date, found.len());
                    urls.extend(found);
                }
                Err(e) => tracing::warn!("Results index {} unavailable: {}", page_url, e),
            }
        }

        urls.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    const PAGE: &str = r#"<html><body>
        <a data-test-selector="link-listCourseNameLink" href="/results/11/cheltenham/2024-03-15/861234">Cheltenham</a>
        <a data-test-selector="link-listCourseNameLink" href="/results/11/cheltenham/2024-03-15/861235">Cheltenham</a>
        <a data-test-selector="link-listCourseNameLink" href="/results/175/leopardstown/2024-03-15/861300">Leopardstown</a>
        <a data-test-selector="link-listCourseNameLink" href="https://www.racingpost.com/results/2/Ascot Heath/2024-03-15/861400">Ascot</a>
        <a href="/results/11/cheltenham/2024-03-15/999999">Unrelated link</a>
    </body></html>"#;

    #[test]
    fn test_date_page_url() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            date_page_url("https://www.racingpost.com/", date),
            "https://www.racingpost.com/results/2024-03-15"
        );
    }

    #[test]
    fn test_parse_date_page_filters_by_course() {
        let selector = Selector::parse(&SiteConfig::default().date_link_selector).unwrap();
        let course_ids: HashSet<String> = ["11", "2"].iter().map(|s| s.to_string()).collect();

        let urls = parse_date_page(PAGE, &selector, &course_ids, "https://www.racingpost.com");
        assert_eq!(
            urls,
            vec![
                "https://www.racingpost.com/results/11/cheltenham/2024-03-15/861234",
                "https://www.racingpost.com/results/11/cheltenham/2024-03-15/861235",
                "https://www.racingpost.com/results/2/Ascot-Heath/2024-03-15/861400",
            ]
        );
    }
}
