use crate::config::types::{
    Config, CourseEntry, ExtractConfig, FetcherConfig, HeaderConfig, SiteConfig, ValidatorConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Columns every record carries regardless of the extraction scheme
pub const FIXED_COLUMNS: [&str; 5] = ["date", "course_id", "course", "race_id", "url"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_header_config(&config.headers)?;
    validate_validator_config(&config.validator)?;
    validate_extract_config(&config.extract)?;
    validate_site_config(&config.site)?;
    validate_courses(&config.courses)?;

    if config.output.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher and worker pool settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.timeout_ms == 0 || config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms and connect_timeout_ms must be non-zero".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_base_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_base_ms ({}) exceeds backoff_max_ms ({})",
            config.backoff_base_ms, config.backoff_max_ms
        )));
    }

    Ok(())
}

fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    // Header values must be visible ASCII
    for value in config.user_agents.iter().chain(&config.accept_languages) {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
            return Err(ConfigError::Validation(format!(
                "invalid header value '{}'",
                value
            )));
        }
    }

    Ok(())
}

fn validate_validator_config(config: &ValidatorConfig) -> Result<(), ConfigError> {
    if config
        .error_phrases
        .iter()
        .chain(&config.error_url_fragments)
        .any(|s| s.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "error phrases and URL fragments cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the extraction scheme
///
/// Every selector is compiled here so that extraction itself cannot fail on a
/// malformed selector.
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.fields.is_empty() {
        return Err(ConfigError::Validation(
            "at least one extract field is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for field in &config.fields {
        if field.name.is_empty() {
            return Err(ConfigError::Validation(
                "extract field name cannot be empty".to_string(),
            ));
        }
        if FIXED_COLUMNS.contains(&field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "extract field '{}' collides with a fixed column",
                field.name
            )));
        }
        if !names.insert(field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate extract field '{}'",
                field.name
            )));
        }
        validate_selector(&field.selector)?;
    }

    for marker in &config.void_markers {
        validate_selector(marker)?;
    }

    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    Url::parse(&config.course_index_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid course_index_url: {}", e)))?;
    validate_selector(&config.date_link_selector)
}

fn validate_courses(courses: &[CourseEntry]) -> Result<(), ConfigError> {
    let mut ids = HashSet::new();
    for course in courses {
        if course.id.is_empty() || course.name.is_empty() || course.region.is_empty() {
            return Err(ConfigError::Validation(format!(
                "course entry {:?} has an empty id, name or region",
                course
            )));
        }
        if course.id.contains('/') {
            return Err(ConfigError::Validation(format!(
                "course id '{}' cannot contain '/'",
                course.id
            )));
        }
        if !ids.insert(course.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate course id '{}'",
                course.id
            )));
        }
    }
    Ok(())
}

/// Compiles a CSS selector, mapping failures to a configuration error
pub fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    compile_selector(selector).map(|_| ())
}

/// Compiles a CSS selector
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
