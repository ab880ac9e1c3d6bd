//! State module for per-URL classification and outcomes
//!
//! # Components
//!
//! - `PageVerdict`: what the validator concluded about a fetched page
//! - `TransportErrorKind`: why a request never produced an HTTP response
//! - `Outcome`: the single result every input URL produces (success, failure or skip)

mod outcome;
mod verdict;

// Re-export main types
pub use outcome::{FailureReason, Outcome};
pub use verdict::{PageVerdict, TransportErrorKind};
