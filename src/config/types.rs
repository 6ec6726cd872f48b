use serde::Deserialize;
use std::time::Duration;

/// Default endpoint for the full company listing
pub const DEFAULT_LIST_URL: &str = "https://yc-oss.github.io/api/companies/all.json";

/// Default origin for company detail pages
pub const DEFAULT_BASE_URL: &str = "https://www.ycombinator.com";

/// Main configuration structure
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Fetch pipeline behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Minimum number of unique companies to collect
    pub limit: usize,

    /// Maximum number of detail fetches in flight
    pub concurrency: usize,

    /// Ceiling on the average outbound request rate
    pub requests_per_second: f64,

    /// Total attempts per request, including the first
    pub max_attempts: u32,

    /// Backoff before the first retry (milliseconds)
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff (milliseconds)
    pub max_delay_ms: u64,

    /// Add a random extra delay of up to one backoff step to each wait
    pub jitter: bool,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            limit: 500,
            concurrency: 20,
            requests_per_second: 10.0,
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter: true,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Where data comes from and what counts as a founder profile link
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// JSON endpoint returning the company array
    pub list_url: String,

    /// Origin for `{base_url}/companies/{slug}`
    pub base_url: String,

    /// Host patterns of the professional network (e.g. "*.linkedin.com")
    pub profile_domains: Vec<String>,

    /// Accepted path prefixes for profile links; empty accepts any path
    pub profile_path_prefixes: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            list_url: DEFAULT_LIST_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            profile_domains: vec!["*.linkedin.com".to_string()],
            profile_path_prefixes: vec!["/in/".to_string()],
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the collector
    pub name: String,

    /// Version of the collector
    pub version: String,

    /// URL with information about the collector
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "yc-founders".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Destination CSV; a timestamped file under `output/` when unset
    pub path: Option<String>,
}
