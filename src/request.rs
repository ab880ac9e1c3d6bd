//! Scrape requests
//!
//! Turns operator input (courses or a region, years, a date range, a race
//! code) into a structured request: which URLs to discover and where the
//! stores go.

use crate::config::{Config, CourseEntry};
use crate::sink::StorePaths;
use crate::HarvestError;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Race type segment used in course index URLs and output folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum RaceCode {
    Flat,
    Jumps,
}

impl RaceCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Jumps => "jumps",
        }
    }
}

impl fmt::Display for RaceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a scrape run should discover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every race at these courses in these years
    Courses {
        courses: Vec<CourseEntry>,
        years: Vec<i32>,
    },
    /// Every race on these dates at courses of one region
    Dates {
        dates: Vec<NaiveDate>,
        course_ids: HashSet<String>,
    },
}

/// A fully resolved scrape request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub selection: Selection,
    pub code: RaceCode,
    pub folder_name: String,
    pub file_name: String,
}

impl ScrapeRequest {
    /// Builds a request for course/year mode
    ///
    /// With `region` set every course of that region is included and the
    /// region names the output folder; otherwise the listed course ids are
    /// used and their names form the folder.
    pub fn for_courses(
        config: &Config,
        course_ids: &[String],
        region: Option<&str>,
        years: &str,
        code: RaceCode,
    ) -> Result<Self, HarvestError> {
        let (courses, folder_name) = match region {
            Some(region) => {
                let courses: Vec<CourseEntry> =
                    config.courses_in_region(region).into_iter().cloned().collect();
                (courses, region.to_lowercase())
            }
            None => {
                let courses = course_ids
                    .iter()
                    .map(|id| {
                        config.course(id).cloned().ok_or_else(|| {
                            HarvestError::Request(format!("unknown course id '{}'", id))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let folder = courses
                    .iter()
                    .map(|c| c.name.to_lowercase().replace(' ', "_"))
                    .collect::<Vec<_>>()
                    .join("_");
                (courses, folder)
            }
        };

        if courses.is_empty() {
            return Err(HarvestError::Request(match region {
                Some(region) => format!("no courses configured for region '{}'", region),
                None => "no courses selected".to_string(),
            }));
        }

        Ok(Self {
            selection: Selection::Courses {
                courses,
                years: parse_years(years)?,
            },
            code,
            folder_name,
            file_name: years.to_string(),
        })
    }

    /// Builds a request for date mode: `YYYY/MM/DD` or `YYYY/MM/DD-YYYY/MM/DD`
    pub fn for_dates(
        config: &Config,
        dates: &str,
        region: &str,
        code: RaceCode,
    ) -> Result<Self, HarvestError> {
        let course_ids: HashSet<String> = config
            .courses_in_region(region)
            .into_iter()
            .map(|c| c.id.clone())
            .collect();

        if course_ids.is_empty() {
            return Err(HarvestError::Request(format!(
                "no courses configured for region '{}'",
                region
            )));
        }

        Ok(Self {
            selection: Selection::Dates {
                dates: parse_dates(dates)?,
                course_ids,
            },
            code,
            folder_name: format!("dates/{}", region.to_lowercase()),
            file_name: dates.replace('/', "_"),
        })
    }

    /// Directory holding this request's stores: `{data_dir}/{folder_name}/{code}`
    pub fn output_dir(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.folder_name).join(self.code.as_str())
    }

    pub fn store_paths(&self, data_dir: &Path) -> StorePaths {
        StorePaths::for_scrape(&self.output_dir(data_dir), &self.file_name)
    }
}

/// Parses `2023` or an inclusive range `2020-2023`
pub fn parse_years(input: &str) -> Result<Vec<i32>, HarvestError> {
    let parse = |s: &str| {
        s.trim()
            .parse::<i32>()
            .map_err(|_| HarvestError::Request(format!("invalid year '{}'", s)))
    };

    let (start, end) = match input.split_once('-') {
        Some((a, b)) => (parse(a)?, parse(b)?),
        None => {
            let year = parse(input)?;
            (year, year)
        }
    };

    if start > end {
        return Err(HarvestError::Request(format!(
            "year range '{}' runs backwards",
            input
        )));
    }
    Ok((start..=end).collect())
}

/// Parses `YYYY/MM/DD` or an inclusive range `YYYY/MM/DD-YYYY/MM/DD`
pub fn parse_dates(input: &str) -> Result<Vec<NaiveDate>, HarvestError> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y/%m/%d")
            .map_err(|_| HarvestError::Request(format!("invalid date '{}' (want YYYY/MM/DD)", s)))
    };

    let (start, end) = match input.split_once('-') {
        Some((a, b)) => (parse(a)?, parse(b)?),
        None => {
            let date = parse(input)?;
            (date, date)
        }
    };

    if start > end {
        return Err(HarvestError::Request(format!(
            "date range '{}' runs backwards",
            input
        )));
    }
    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}
