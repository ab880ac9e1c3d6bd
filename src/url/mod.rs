//! URL handling module for Race-Harvest
//!
//! This module provides result-page URL shape validation and the canonical
//! URL form the target site expects.

mod canonical;
mod shape;

// Re-export main functions
pub use canonical::{canonicalize_url, result_url};
pub use shape::ParsedUrl;
