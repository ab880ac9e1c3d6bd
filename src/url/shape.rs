//! Result-page URL shape
//!
//! Result pages live at
//! `https://<host>/results/{course_id}/{course_name}/{YYYY-MM-DD}/{entity_id}`.
//! Splitting that string on `/` puts the course id at index 4, the course
//! name at 5, the date at 6 and the entity id at 7.

use crate::ShapeError;
use chrono::NaiveDate;

const COURSE_ID: usize = 4;
const COURSE_NAME: usize = 5;
const DATE: usize = 6;
const ENTITY_ID: usize = 7;
const MIN_SEGMENTS: usize = ENTITY_ID + 1;

/// Identifiers carried by a result-page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    url: String,
    course_id: String,
    course_name: String,
    date: NaiveDate,
    entity_id: String,
}

impl ParsedUrl {
    /// Validates a result-page URL and pulls out its identifiers
    ///
    /// # Examples
    ///
    /// ```
    /// use race_harvest::url::ParsedUrl;
    ///
    /// let parsed =
    ///     ParsedUrl::parse("https://example.com/results/11/cheltenham/2018-05-04/698501").unwrap();
    /// assert_eq!(parsed.course_id(), "11");
    /// assert_eq!(parsed.entity_id(), "698501");
    ///
    /// assert!(ParsedUrl::parse("https://example.com/results/11").is_err());
    /// ```
    pub fn parse(url: &str) -> Result<Self, ShapeError> {
        let segments: Vec<&str> = url.split('/').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(ShapeError::TooFewSegments {
                url: url.to_string(),
                found: segments.len(),
            });
        }

        let segment = |index: usize| -> Result<&str, ShapeError> {
            // The entity id is the last path segment; drop any query or fragment
            let raw = segments[index];
            let value = if index == ENTITY_ID {
                raw.split(['?', '#']).next().unwrap_or("")
            } else {
                raw
            };
            if value.is_empty() {
                Err(ShapeError::EmptySegment {
                    url: url.to_string(),
                    index,
                })
            } else {
                Ok(value)
            }
        };

        let course_id = segment(COURSE_ID)?;
        let course_name = segment(COURSE_NAME)?;
        let date_str = segment(DATE)?;
        let entity_id = segment(ENTITY_ID)?;

        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
            ShapeError::InvalidDate {
                url: url.to_string(),
                value: date_str.to_string(),
            }
        })?;

        Ok(Self {
            url: url.to_string(),
            course_id: course_id.to_string(),
            course_name: course_name.to_string(),
            date,
            entity_id: entity_id.to_string(),
        })
    }

    /// The full URL as given
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The race date in `YYYY-MM-DD` form
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The race (entity) identifier
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }
}
