//! Output module for run reporting
//!
//! This module handles:
//! - Tallying outcomes while a batch runs
//! - Formatting the end-of-run summary shown to the operator

pub mod stats;

pub use stats::{format_report, print_report, OutcomeCounts, RunReport};
