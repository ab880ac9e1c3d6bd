//! Configuration module for Race-Harvest
//!
//! This module handles loading, parsing, and validating the TOML settings file.
//! Every section is optional; missing keys fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use race_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("settings.toml")).unwrap();
//! println!("Fetch timeout: {}ms", config.fetcher.timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CourseEntry, ExtractConfig, FetcherConfig, FieldEntry, HeaderConfig, OutputConfig,
    SiteConfig, ValidatorConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{compile_selector, FIXED_COLUMNS};
