//! Bounded exponential backoff with jitter

use crate::config::FetcherConfig;
use rand::Rng;
use std::time::Duration;

/// Jitter: ±20% of the nominal delay
const JITTER_PERCENT: f64 = 0.2;

/// Delay schedule between attempts at one URL
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            base_ms: config.backoff_base_ms,
            max_ms: config.backoff_max_ms,
        }
    }

    /// Delay before attempt `failed_attempts + 1`, without jitter
    ///
    /// Doubles from the base delay and never exceeds the configured maximum.
    pub fn nominal(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(20);
        let delay = self.base_ms.saturating_mul(1u64 << exponent).min(self.max_ms);
        Duration::from_millis(delay)
    }

    /// Delay before the next attempt, with jitter applied
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        let nominal = self.nominal(failed_attempts).as_millis() as f64;
        let jitter = rand::thread_rng().gen_range(-JITTER_PERCENT..=JITTER_PERCENT);
        Duration::from_millis((nominal * (1.0 + jitter)).round() as u64)
    }
}
