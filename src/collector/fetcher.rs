//! HTTP fetcher implementation
//!
//! This module handles the per-company detail requests:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Mapping each detail response onto a [`FetchResult`]
//!
//! # Outcome Mapping
//!
//! | Response | Result |
//! |----------|--------|
//! | HTTP 2xx | `Success(body)` |
//! | HTTP 404 | `Skipped(NotFound)`, no retry |
//! | Transient error | Retried, then `Failure` |
//! | Permanent error | `Failure` immediately |

use super::limiter::RateLimiter;
use super::retry::NetworkError;
use crate::config::{ScraperConfig, UserAgentConfig};
use crate::records::{FetchFailure, FetchResult, SkipReason};
use crate::url::detail_url;
use reqwest::{Client, StatusCode};

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use yc_founders::config::Config;
/// use yc_founders::collector::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.scraper, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    scraper: &ScraperConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(scraper.request_timeout())
        .connect_timeout(scraper.connect_timeout())
        .pool_max_idle_per_host(scraper.concurrency)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Body of one detail response that is not an error
enum DetailPage {
    Html(String),
    NotFound,
}

/// Fetches one company's detail page through the shared limiter
///
/// Safe to call concurrently for many slugs; all calls share `limiter`.
/// Never returns an error: failures are part of the result.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `limiter` - The run's shared rate limiter
/// * `base_url` - Origin of detail pages
/// * `slug` - Company identifier
pub async fn fetch_detail(
    client: &Client,
    limiter: &RateLimiter,
    base_url: &str,
    slug: &str,
) -> FetchResult {
    let url = match detail_url(base_url, slug) {
        Ok(url) => url,
        Err(e) => {
            return FetchResult::Failure(FetchFailure {
                reason: format!("cannot build detail URL: {}", e),
                attempts: 0,
                permanent: true,
            })
        }
    };

    let outcome = limiter
        .execute(slug, || {
            let url = url.clone();
            async move {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| NetworkError::from_reqwest(&e))?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(DetailPage::NotFound);
                }
                if !status.is_success() {
                    return Err(NetworkError::from_status(status));
                }

                response
                    .text()
                    .await
                    .map(DetailPage::Html)
                    .map_err(|e| NetworkError::from_reqwest(&e))
            }
        })
        .await;

    match outcome {
        Ok(DetailPage::Html(body)) => FetchResult::Success(body),
        Ok(DetailPage::NotFound) => {
            tracing::debug!("{}: detail page not found", slug);
            FetchResult::Skipped(SkipReason::NotFound)
        }
        Err(failure) => {
            tracing::warn!("{}: detail fetch failed: {}", slug, failure);
            FetchResult::Failure(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::retry::RetryPolicy;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&ScraperConfig::default(), &UserAgentConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let mut ua = UserAgentConfig {
            name: "TestCollector".to_string(),
            version: "1.0".to_string(),
            contact_url: None,
        };
        assert_eq!(ua.header_value(), "TestCollector/1.0");

        ua.contact_url = Some("https://example.com/about".to_string());
        assert_eq!(ua.header_value(), "TestCollector/1.0 (+https://example.com/about)");
    }

    #[tokio::test]
    async fn test_bad_base_url_is_permanent_failure() {
        let client = Client::new();
        let limiter = RateLimiter::new(100.0, RetryPolicy::no_retry());

        let result = fetch_detail(&client, &limiter, "not a url", "acme").await;

        match result {
            FetchResult::Failure(failure) => {
                assert!(failure.permanent);
                assert_eq!(failure.attempts, 0);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(limiter.stats().requests, 0);
    }

    // HTTP status handling is exercised against wiremock in the integration tests
}
