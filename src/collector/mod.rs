//! Collector module for listing, detail fetching and founder extraction
//!
//! This module contains the core collection logic, including:
//! - Listing retrieval and normalization
//! - HTTP fetching with retry logic
//! - Shared rate limiting
//! - Founder extraction from detail pages
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod limiter;
mod listing;
mod parser;
mod retry;

pub use coordinator::{run_collection, CompanyOutcome, Coordinator, Outcome};
pub use fetcher::{build_http_client, fetch_detail};
pub use limiter::{LimiterStats, RateLimiter};
pub use listing::{collect_unique, fetch_company_list};
pub use parser::{parse_founder_page, parse_founders, FounderParser, ParsedFounders};
pub use retry::{NetworkError, RetryPolicy};
