//! Request header rotation
//!
//! Every request gets a freshly drawn header set so the traffic does not
//! carry one uniform fingerprint.

use crate::config::HeaderConfig;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

const ACCEPT_VALUES: [&str; 3] = [
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    "text/html,application/xhtml+xml;q=0.9,*/*;q=0.7",
];

/// Supplies the header set attached to one request
pub trait HeaderProvider: Send + Sync {
    fn headers(&self) -> HeaderMap;
}

/// Draws user agent, Accept and Accept-Language at random per call
#[derive(Debug, Clone)]
pub struct RandomHeaders {
    user_agents: Vec<HeaderValue>,
    accept_languages: Vec<HeaderValue>,
}

impl RandomHeaders {
    /// Builds the pool from configuration
    ///
    /// Values that are not valid header text are dropped with a warning.
    pub fn new(config: &HeaderConfig) -> Self {
        Self {
            user_agents: to_header_values(&config.user_agents),
            accept_languages: to_header_values(&config.accept_languages),
        }
    }
}

fn to_header_values(values: &[String]) -> Vec<HeaderValue> {
    values
        .iter()
        .filter_map(|v| match HeaderValue::from_str(v) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid header value: {}", v);
                None
            }
        })
        .collect()
}

impl HeaderProvider for RandomHeaders {
    fn headers(&self) -> HeaderMap {
        let mut rng = rand::thread_rng();
        let mut headers = HeaderMap::new();

        if let Some(agent) = self.user_agents.choose(&mut rng) {
            headers.insert(USER_AGENT, agent.clone());
        }
        if let Some(accept) = ACCEPT_VALUES.choose(&mut rng) {
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }
        if let Some(language) = self.accept_languages.choose(&mut rng) {
            headers.insert(ACCEPT_LANGUAGE, language.clone());
        }

        headers
    }
}
