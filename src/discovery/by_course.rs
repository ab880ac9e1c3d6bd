//! Discovery by course and year

use crate::config::CourseEntry;
use crate::discovery::UrlDiscovery;
use crate::url::result_url;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
struct CourseIndex {
    data: Option<CourseIndexData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseIndexData {
    principle_race_results: Option<Vec<RaceSummary>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RaceSummary {
    race_datetime: String,
    race_instance_uid: RaceUid,
}

/// Race ids arrive as numbers or strings depending on the endpoint
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RaceUid {
    Number(u64),
    Text(String),
}

impl RaceUid {
    fn to_id(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// JSON index URL for one course's races in one year
pub fn course_index_url(index_base: &str, course: &CourseEntry, year: i32, code: &str) -> String {
    format!(
        "{}/{}/{}/{}/all-races",
        index_base.trim_end_matches('/'),
        course.id.to_lowercase(),
        year,
        code
    )
}

/// Builds result URLs from a course index document
///
/// Races whose datetime does not start with a `YYYY-MM-DD` date are skipped.
pub fn parse_course_index(
    json: &str,
    course: &CourseEntry,
    base_url: &str,
) -> Result<Vec<String>, serde_json::Error> {
    let index: CourseIndex = serde_json::from_str(json)?;
    let races = index
        .data
        .and_then(|d| d.principle_race_results)
        .unwrap_or_default();

    let mut urls = Vec::with_capacity(races.len());
    for race in races {
        let date = race
            .race_datetime
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        match date {
            Some(date) => urls.push(result_url(
                base_url,
                &course.id,
                &course.name,
                date,
                &race.race_instance_uid.to_id(),
            )),
            None => tracing::warn!(
                "Skipping race with unreadable datetime '{}' at {}",
                race.race_datetime,
                course.name
            ),
        }
    }
    Ok(urls)
}

impl UrlDiscovery {
    /// Discovers result URLs for every (course, year) pair
    pub async fn by_course(
        &self,
        courses: &[CourseEntry],
        years: &[i32],
        code: &str,
    ) -> Vec<String> {
        let mut urls = BTreeSet::new();

        for course in courses {
            for &year in years {
                let index_url = course_index_url(&self.site.course_index_url, course, year, code);
                tracing::debug!("Fetching course index {}", index_url);

                let body = match self.fetcher.fetch_text(&index_url).await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!("Course index {} unavailable: {}", index_url, e);
                        continue;
                    }
                };

                match parse_course_index(&body, course, &self.site.base_url) {
                    Ok(found) => {
                        tracing::info!("{} {}: {} races", course.name, year, found.len());
                        urls.extend(found);
                    }
                    Err(e) => tracing::warn!("Course index {} unreadable: {}", index_url, e),
                }
            }
        }

        urls.into_iter().collect()
    }
}
