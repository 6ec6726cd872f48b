//! Collection coordinator - main run orchestration logic
//!
//! This module ties the pipeline together:
//! - Building the HTTP client and the single shared rate limiter
//! - Fetching the company listing
//! - Fanning detail fetches out over a bounded set of workers
//! - Parsing each page and gathering per-company outcomes
//! - Aggregating, exporting and reporting

use super::fetcher::{build_http_client, fetch_detail};
use super::limiter::{LimiterStats, RateLimiter};
use super::listing::fetch_company_list;
use super::parser::FounderParser;
use crate::config::Config;
use crate::output::{aggregate, export_csv, resolve_output_path, RunReport};
use crate::records::{CompanyRecord, FetchFailure, FetchResult, FounderRecord, SkipReason};
use crate::url::ProfileMatcher;
use crate::ScrapeError;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Completed companies between two progress log lines
const PROGRESS_INTERVAL: usize = 50;

/// What happened to one company's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Page fetched and parsed; `anomaly` is set when the page did not have
    /// the expected founder structure
    Parsed { anomaly: bool },

    /// Page fetch skipped; the company still gets a placeholder row
    Skipped(SkipReason),

    /// Page fetch failed; the company is excluded from the output
    Failed(FetchFailure),
}

/// One worker's result for one company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyOutcome {
    pub slug: String,
    pub outcome: Outcome,
    pub founders: Vec<FounderRecord>,
}

impl CompanyOutcome {
    fn from_fetch(slug: &str, result: FetchResult, parser: &FounderParser) -> Self {
        tracing::trace!("{}: detail fetch {}", slug, result.label());

        let (outcome, founders) = match result {
            FetchResult::Success(body) => {
                let parsed = parser.parse(&body);
                let anomaly = parsed.is_anomalous();

                if anomaly && !parsed.section_found {
                    tracing::warn!("{}: no founder section found on detail page", slug);
                } else if anomaly {
                    tracing::warn!(
                        "{}: {} founder blocks found but none had a name",
                        slug,
                        parsed.skipped_blocks
                    );
                } else if !parsed.section_found {
                    tracing::debug!(
                        "{}: {} founders read from profile links and page text",
                        slug,
                        parsed.founders.len()
                    );
                }

                (Outcome::Parsed { anomaly }, parsed.founders)
            }
            FetchResult::Skipped(reason) => (Outcome::Skipped(reason), Vec::new()),
            FetchResult::Failure(failure) => (Outcome::Failed(failure), Vec::new()),
        };

        Self {
            slug: slug.to_string(),
            outcome,
            founders,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Main collection coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    limiter: Arc<RateLimiter>,
    parser: Arc<FounderParser>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Client and limiter are ready
    /// * `Err(ScrapeError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.scraper, &config.user_agent)?;
        let limiter = RateLimiter::from_config(&config.scraper);
        let parser = FounderParser::new(ProfileMatcher::from_config(&config.source));

        tracing::debug!(
            "Request spacing {:?}, up to {} attempts per request",
            limiter.interval(),
            limiter.policy().max_attempts
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            limiter: Arc::new(limiter),
            parser: Arc::new(parser),
        })
    }

    /// Fetches the listing and selects the configured number of companies
    pub async fn fetch_companies(&self) -> Result<Vec<CompanyRecord>, ScrapeError> {
        fetch_company_list(
            &self.client,
            &self.limiter,
            &self.config.source.list_url,
            self.config.scraper.limit,
        )
        .await
    }

    /// Fetches and parses every company's detail page
    ///
    /// At most `concurrency` workers are in flight; all of them share the
    /// rate limiter. The returned outcomes are in the same order as
    /// `companies`, whatever order the workers finish in.
    pub async fn collect_founders(&self, companies: &[CompanyRecord]) -> Vec<CompanyOutcome> {
        let total = companies.len();
        let semaphore = Arc::new(Semaphore::new(self.config.scraper.concurrency.max(1)));
        let base_url: Arc<str> = Arc::from(self.config.source.base_url.as_str());
        let mut set = JoinSet::new();

        tracing::info!(
            "Fetching {} detail pages with {} workers",
            total,
            self.config.scraper.concurrency
        );

        for (index, company) in companies.iter().enumerate() {
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let limiter = self.limiter.clone();
            let parser = self.parser.clone();
            let base_url = base_url.clone();
            let slug = company.slug.clone();

            set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_detail(&client, &limiter, &base_url, &slug).await,
                    Err(e) => FetchResult::Failure(FetchFailure {
                        reason: format!("worker pool closed: {}", e),
                        attempts: 0,
                        permanent: true,
                    }),
                };
                (index, CompanyOutcome::from_fetch(&slug, result, &parser))
            });
        }

        let mut slots: Vec<Option<CompanyOutcome>> = vec![None; total];
        let mut completed = 0usize;
        let started = Instant::now();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::warn!(%e, "detail worker task failed"),
            }

            completed += 1;
            if completed % PROGRESS_INTERVAL == 0 || completed == total {
                let rate = completed as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {}/{} companies processed, {:.2} companies/sec",
                    completed,
                    total,
                    rate
                );
            }
        }

        slots
            .into_iter()
            .zip(companies)
            .map(|(slot, company)| {
                slot.unwrap_or_else(|| CompanyOutcome {
                    slug: company.slug.clone(),
                    outcome: Outcome::Failed(FetchFailure {
                        reason: "worker task did not complete".to_string(),
                        attempts: 0,
                        permanent: true,
                    }),
                    founders: Vec::new(),
                })
            })
            .collect()
    }

    /// Runs the full pipeline and writes the output file
    ///
    /// 1. Fetch the listing (fatal on failure or insufficient data)
    /// 2. Fetch and parse every detail page
    /// 3. Drop failed companies and aggregate the rest into rows
    /// 4. Write the CSV atomically
    /// 5. Return the run report
    pub async fn run(&self) -> Result<RunReport, ScrapeError> {
        let started = Instant::now();

        let companies = self.fetch_companies().await?;
        let outcomes = self.collect_founders(&companies).await;

        let mut founders_by_slug = HashMap::with_capacity(outcomes.len());
        let mut exported = Vec::with_capacity(companies.len());
        for (company, outcome) in companies.iter().zip(&outcomes) {
            if outcome.is_failed() {
                continue;
            }
            founders_by_slug.insert(company.slug.clone(), outcome.founders.clone());
            exported.push(company.clone());
        }

        let rows = aggregate(&exported, &founders_by_slug);
        let path = resolve_output_path(self.config.output.path.as_deref(), chrono::Local::now());

        tracing::info!("Writing {} rows to {}", rows.len(), path.display());
        let rows_written = export_csv(&rows, &path)?;

        let mut report = RunReport::new(self.config.scraper.limit);
        for outcome in &outcomes {
            report.record(outcome);
        }
        report.finish(rows_written, self.limiter_stats(), path, started.elapsed());

        tracing::info!(
            "Run completed: {} rows for {} companies in {:?}",
            report.rows_written,
            exported.len(),
            report.elapsed
        );

        Ok(report)
    }

    pub fn limiter_stats(&self) -> LimiterStats {
        self.limiter.stats()
    }
}

/// Runs a complete collection
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client and the shared rate limiter
/// 2. Fetch the company listing
/// 3. Fetch and parse every detail page
/// 4. Write the CSV file
/// 5. Return the run report
///
/// On `Err`, or when the returned future is dropped before completing, no
/// file exists at the output path.
///
/// # Example
///
/// ```no_run
/// use yc_founders::config::Config;
/// use yc_founders::collector::run_collection;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_collection(Config::default()).await?;
/// println!("{} rows written", report.rows_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_collection(config: Config) -> Result<RunReport, ScrapeError> {
    Coordinator::new(config)?.run().await
}
