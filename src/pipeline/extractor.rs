//! Field extraction from result pages
//!
//! Each configured field names a CSS selector. The text of every matched
//! element is flattened (descendant text in document order, whitespace runs
//! collapsed, trimmed), empty items are dropped and the rest are joined with
//! the field's delimiter. A selector that matches nothing yields an empty
//! string: a page without an info block is still a usable record.

use crate::config::{compile_selector, ExtractConfig, FIXED_COLUMNS};
use crate::url::ParsedUrl;
use crate::{ConfigError, ShapeError};
use scraper::{Html, Selector};

/// One structured record pulled from a result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    parsed: ParsedUrl,
    fields: Vec<(String, String)>,
}

impl ExtractedRecord {
    pub fn new(parsed: ParsedUrl, fields: Vec<(String, String)>) -> Self {
        Self { parsed, fields }
    }

    /// The source URL
    pub fn url(&self) -> &str {
        self.parsed.url()
    }

    /// Looks up an extracted field by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Values in output column order: date, course_id, course, race_id, fields..., url
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.fields.len() + FIXED_COLUMNS.len());
        row.push(self.parsed.date_string());
        row.push(self.parsed.course_id().to_string());
        row.push(self.parsed.course_name().to_string());
        row.push(self.parsed.entity_id().to_string());
        row.extend(self.fields.iter().map(|(_, v)| v.clone()));
        row.push(self.parsed.url().to_string());
        row
    }
}

#[derive(Debug, Clone)]
struct CompiledField {
    name: String,
    selector: Selector,
    delimiter: String,
}

/// Applies the configured field scheme to parsed documents
#[derive(Debug, Clone)]
pub struct Extractor {
    fields: Vec<CompiledField>,
    void_markers: Vec<(String, Selector)>,
}

impl Extractor {
    /// Compiles the field scheme
    pub fn new(config: &ExtractConfig) -> Result<Self, ConfigError> {
        let fields = config
            .fields
            .iter()
            .map(|f| {
                Ok(CompiledField {
                    name: f.name.clone(),
                    selector: compile_selector(&f.selector)?,
                    delimiter: f.delimiter.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let void_markers = config
            .void_markers
            .iter()
            .map(|m| Ok((m.clone(), compile_selector(m)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            fields,
            void_markers,
        })
    }

    /// Output header matching [`ExtractedRecord::to_row`]
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = FIXED_COLUMNS[..4].iter().map(|c| c.to_string()).collect();
        header.extend(self.fields.iter().map(|f| f.name.clone()));
        header.push(FIXED_COLUMNS[4].to_string());
        header
    }

    /// Returns the first void marker present on the page, if any
    pub fn void_marker(&self, document: &Html) -> Option<&str> {
        self.void_markers
            .iter()
            .find(|(_, selector)| document.select(selector).next().is_some())
            .map(|(marker, _)| marker.as_str())
    }

    /// Extracts a record, validating the URL shape first
    pub fn extract(&self, document: &Html, url: &str) -> Result<ExtractedRecord, ShapeError> {
        Ok(self.extract_parsed(document, ParsedUrl::parse(url)?))
    }

    /// Extracts a record for an already validated URL
    pub fn extract_parsed(&self, document: &Html, parsed: ParsedUrl) -> ExtractedRecord {
        let fields = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), join_items(document, &f.selector, &f.delimiter)))
            .collect();
        ExtractedRecord::new(parsed, fields)
    }
}

/// Flattens every matched element's text and joins the non-empty ones
fn join_items(document: &Html, selector: &Selector, delimiter: &str) -> String {
    document
        .select(selector)
        .map(|item| {
            item.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldEntry;

    const URL: &str = "https://www.racingpost.com/results/11/cheltenham/2018-05-04/698501";

    fn extractor() -> Extractor {
        Extractor::new(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn test_info_block_join() {
        let html = Html::parse_document(
            r#"<div class="rp-raceInfo"><ul>
                <li>Class 4</li>
                <li>  <span>3yo+</span>
                </li>
                <li>   </li>
                <li>Distance: <b>2m</b>  <i>4f</i></li>
            </ul></div>"#,
        );
        let record = extractor().extract(&html, URL).unwrap();
        assert_eq!(
            record.field("race_info"),
            Some("Class 4 ||3yo+ ||Distance: 2m 4f")
        );
    }

    #[test]
    fn test_missing_container_is_empty() {
        let html = Html::parse_document("<html><body><p>No info</p></body></html>");
        let record = extractor().extract(&html, URL).unwrap();
        assert_eq!(record.field("race_info"), Some(""));
    }

    #[test]
    fn test_empty_container_is_empty() {
        let html = Html::parse_document(r#"<div class="rp-raceInfo"><ul></ul></div>"#);
        let record = extractor().extract(&html, URL).unwrap();
        assert_eq!(record.field("race_info"), Some(""));
    }

    #[test]
    fn test_short_url_is_extraction_error() {
        let html = Html::parse_document("<div></div>");
        let result = extractor().extract(&html, "https://www.racingpost.com/results/11");
        assert!(matches!(result, Err(ShapeError::TooFewSegments { .. })));
    }

    #[test]
    fn test_row_and_header_line_up() {
        let extractor = extractor();
        let html = Html::parse_document(r#"<div class="rp-raceInfo"><li>Class 1</li></div>"#);
        let record = extractor.extract(&html, URL).unwrap();

        assert_eq!(
            extractor.header(),
            vec!["date", "course_id", "course", "race_id", "race_info", "url"]
        );
        assert_eq!(
            record.to_row(),
            vec!["2018-05-04", "11", "cheltenham", "698501", "Class 1", URL]
        );
    }

    #[test]
    fn test_multiple_fields_and_void_marker() {
        let config = ExtractConfig {
            void_markers: vec!["div.rp-raceVoid".to_string()],
            fields: vec![
                FieldEntry {
                    name: "title".to_string(),
                    selector: "h1".to_string(),
                    delimiter: " ||".to_string(),
                },
                FieldEntry {
                    name: "going".to_string(),
                    selector: "span.going".to_string(),
                    delimiter: ";".to_string(),
                },
            ],
        };
        let extractor = Extractor::new(&config).unwrap();

        let html = Html::parse_document(
            r#"<h1>Big Race</h1><span class="going">Good</span><span class="going">Soft</span>"#,
        );
        assert!(extractor.void_marker(&html).is_none());
        let record = extractor.extract(&html, URL).unwrap();
        assert_eq!(record.field("title"), Some("Big Race"));
        assert_eq!(record.field("going"), Some("Good;Soft"));

        let void = Html::parse_document(r#"<div class="rp-raceVoid">Void race</div>"#);
        assert_eq!(extractor.void_marker(&void), Some("div.rp-raceVoid"));
    }
}
