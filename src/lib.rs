//! Race-Harvest: a resilient batch scraper for race result pages
//!
//! This crate discovers result-page URLs, fetches each page with a rotating
//! request header, classifies whether the page carries real content, extracts
//! structured fields and appends them to CSV stores. URLs that fail land in a
//! failure store which a retry pass feeds back through the same pipeline.

pub mod config;
pub mod discovery;
pub mod output;
pub mod pipeline;
pub mod request;
pub mod sink;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Race-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("URL shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Store error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    Request(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result-page URL shape errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{url}: expected at least 8 '/'-separated segments, found {found}")]
    TooFewSegments { url: String, found: usize },

    #[error("{url}: segment {index} is empty")]
    EmptySegment { url: String, index: usize },

    #[error("{url}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { url: String, value: String },
}

/// Result type alias for Race-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{FailureReason, Outcome, PageVerdict, TransportErrorKind};
pub use url::{canonicalize_url, ParsedUrl};
