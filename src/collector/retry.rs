//! Retry policy and network error classification
//!
//! | Condition | Classification |
//! |-----------|----------------|
//! | Timeout | Transient |
//! | Connection refused / reset | Transient |
//! | HTTP 429 | Transient |
//! | HTTP 5xx | Transient |
//! | DNS resolution failure | Permanent |
//! | HTTP 4xx (except 429) | Permanent |
//! | Undecodable body, bad redirect | Permanent |

use crate::config::ScraperConfig;
use backon::ExponentialBuilder;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// A failed network operation, classified by whether retrying can help
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("{0}")]
    Transient(String),

    #[error("{0}")]
    Permanent(String),
}

impl NetworkError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, NetworkError::Transient(_))
    }

    /// Classifies a non-success HTTP status
    pub fn from_status(status: StatusCode) -> Self {
        let reason = format!("HTTP {}", status);
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            NetworkError::Transient(reason)
        } else {
            NetworkError::Permanent(reason)
        }
    }

    /// Classifies a transport-level error from the HTTP client
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status);
        }

        if err.is_timeout() {
            return NetworkError::Transient("request timed out".to_string());
        }

        if is_dns_failure(err) {
            return NetworkError::Permanent(format!("DNS resolution failed: {}", err));
        }

        if err.is_connect() {
            return NetworkError::Transient(format!("connection failed: {}", err));
        }

        if err.is_decode() || err.is_builder() || err.is_redirect() {
            return NetworkError::Permanent(err.to_string());
        }

        // Body read interrupted, connection reset mid-response, etc.
        NetworkError::Transient(err.to_string())
    }
}

/// Walks the source chain looking for the resolver's error text
fn is_dns_failure(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(e) = source {
        let message = e.to_string().to_lowercase();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = e.source();
    }
    false
}

/// How many times to try a request and how long to wait between tries
///
/// The wait before retry `n` (1-based) is `min(base_delay * 2^(n-1), max_delay)`.
/// With `jitter` on, a random extra delay of up to that step is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
        }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Retries allowed after the first attempt
    pub fn max_retries(&self) -> usize {
        self.max_attempts.saturating_sub(1) as usize
    }

    /// Backoff schedule for one request
    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries());

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}
