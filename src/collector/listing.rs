//! Company listing fetch
//!
//! Retrieves the JSON array of companies, turns each entry into a
//! [`CompanyRecord`], and enforces the minimum-count contract: either at
//! least `limit` unique slugs are available or the run fails with
//! [`ScrapeError::InsufficientData`].

use super::limiter::RateLimiter;
use super::retry::NetworkError;
use crate::records::CompanyRecord;
use crate::ScrapeError;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;

/// Fetches the listing and returns the first `limit` unique companies
///
/// The request goes through the shared limiter, so it is spaced and retried
/// like any detail fetch. Any failure here is run-fatal.
///
/// # Returns
///
/// * `Ok(Vec<CompanyRecord>)` - Exactly `limit` companies, in listing order
/// * `Err(ScrapeError::Listing)` - The listing could not be fetched or is not a JSON array
/// * `Err(ScrapeError::InsufficientData)` - Fewer than `limit` unique companies
pub async fn fetch_company_list(
    client: &Client,
    limiter: &RateLimiter,
    list_url: &str,
    limit: usize,
) -> Result<Vec<CompanyRecord>, ScrapeError> {
    tracing::info!("Fetching company list from {}", list_url);

    let body = limiter
        .execute("company list", || async move {
            let response = client
                .get(list_url)
                .send()
                .await
                .map_err(|e| NetworkError::from_reqwest(&e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(NetworkError::from_status(status));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| NetworkError::from_reqwest(&e))
        })
        .await
        .map_err(|failure| ScrapeError::Listing {
            url: list_url.to_string(),
            reason: failure.to_string(),
        })?;

    let Value::Array(entries) = body else {
        return Err(ScrapeError::Listing {
            url: list_url.to_string(),
            reason: "response body is not a JSON array".to_string(),
        });
    };

    tracing::info!("Retrieved {} listing entries", entries.len());
    collect_unique(&entries, limit)
}

/// Normalizes raw listing entries and takes the first `limit` unique slugs
///
/// Malformed entries are skipped with a warning; a repeated slug keeps its
/// first occurrence.
pub fn collect_unique(entries: &[Value], limit: usize) -> Result<Vec<CompanyRecord>, ScrapeError> {
    let mut seen = HashSet::new();
    let mut companies = Vec::new();
    let mut malformed = 0usize;
    let mut duplicates = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        let company = match CompanyRecord::from_json(entry) {
            Ok(company) => company,
            Err(reason) => {
                tracing::warn!("Skipping listing entry {}: {}", index, reason);
                malformed += 1;
                continue;
            }
        };

        if !seen.insert(company.slug.clone()) {
            tracing::debug!("Skipping duplicate slug '{}'", company.slug);
            duplicates += 1;
            continue;
        }

        companies.push(company);
    }

    if malformed > 0 || duplicates > 0 {
        tracing::info!(
            "Listing had {} malformed and {} duplicate entries",
            malformed,
            duplicates
        );
    }

    if companies.len() < limit {
        return Err(ScrapeError::InsufficientData {
            requested: limit,
            available: companies.len(),
        });
    }

    companies.truncate(limit);
    tracing::info!("Selected {} companies", companies.len());
    Ok(companies)
}
