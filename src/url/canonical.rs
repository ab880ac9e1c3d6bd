//! Canonical result URL form
//!
//! The site expects spaces in course names as hyphens and no apostrophes.

use chrono::NaiveDate;

/// Rewrites a URL into the site's canonical form
///
/// # Examples
///
/// ```
/// use race_harvest::url::canonicalize_url;
///
/// assert_eq!(
///     canonicalize_url("https://example.com/results/1/Bangor On Dee/2024-01-01/9"),
///     "https://example.com/results/1/Bangor-On-Dee/2024-01-01/9"
/// );
/// assert_eq!(canonicalize_url("/results/2/Ffos Las'/x"), "/results/2/Ffos-Las/x");
/// ```
pub fn canonicalize_url(url: &str) -> String {
    url.replace(' ', "-").replace('\'', "")
}

/// Builds the canonical result-page URL for one race
pub fn result_url(
    base_url: &str,
    course_id: &str,
    course_name: &str,
    date: NaiveDate,
    race_id: &str,
) -> String {
    canonicalize_url(&format!(
        "{}/results/{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        course_id,
        course_name,
        date.format("%Y-%m-%d"),
        race_id
    ))
}
