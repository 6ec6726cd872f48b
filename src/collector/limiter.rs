//! Shared rate limiter with built-in retry
//!
//! One `RateLimiter` is created per run and shared (behind an `Arc`) by the
//! listing fetch and every detail worker. It enforces:
//! - A minimum spacing between consecutive requests, derived from the
//!   requests-per-second ceiling
//! - The retry policy for transient failures, driven by `backon`
//!
//! Concurrency (how many requests are in flight) is bounded separately by the
//! coordinator's semaphore.

use super::retry::{NetworkError, RetryPolicy};
use crate::config::ScraperConfig;
use crate::records::FetchFailure;
use backon::Retryable;
use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Snapshot of the limiter's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimiterStats {
    /// Requests issued, retries included
    pub requests: u64,

    /// Retries performed after transient failures
    pub retries: u64,
}

pub struct RateLimiter {
    /// Minimum time between two request slots
    interval: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Instant>,

    policy: RetryPolicy,

    requests: AtomicU64,
    retries: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter allowing at most `requests_per_second` on average
    ///
    /// A non-positive or non-finite rate disables spacing.
    pub fn new(requests_per_second: f64, policy: RetryPolicy) -> Self {
        let interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
            policy,
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.requests_per_second, RetryPolicy::from_config(config))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Waits until this caller's request slot arrives
    ///
    /// Slots are handed out in call order, `interval` apart. The lock is held
    /// only to reserve a slot, never across the sleep.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = (*next).max(now);
            *next = slot + self.interval;
            slot
        };

        tokio::time::sleep_until(slot).await;
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Runs `op` under the rate limit, retrying transient failures
    ///
    /// Every attempt takes its own slot. Exhausted retries and permanent
    /// errors come back as a `FetchFailure`; this never panics or propagates
    /// the underlying error type.
    ///
    /// # Arguments
    ///
    /// * `label` - What is being fetched, for log messages
    /// * `op` - Produces one attempt's future
    pub async fn execute<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, NetworkError>>,
    {
        let attempts = AtomicU32::new(0);

        let attempt = || {
            attempts.fetch_add(1, Ordering::Relaxed);
            let request = op();
            async move {
                self.acquire().await;
                request.await
            }
        };

        let result = attempt
            .retry(self.policy.backoff())
            .when(NetworkError::is_retryable)
            .notify(|error: &NetworkError, delay: Duration| {
                self.retries.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("{}: attempt failed ({}), retrying in {:?}", label, error, delay);
            })
            .await;

        result.map_err(|error| {
            let attempts = attempts.load(Ordering::Relaxed);
            if error.is_retryable() {
                tracing::debug!("{}: giving up after {} attempts: {}", label, attempts, error);
            }
            FetchFailure {
                reason: error.to_string(),
                attempts,
                permanent: !error.is_retryable(),
            }
        })
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            requests: self.requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}
