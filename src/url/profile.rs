use super::matches_wildcard;
use crate::config::SourceConfig;
use url::Url;

/// Decides whether a link points at a founder's professional-network profile
///
/// A link qualifies when it is an absolute http(s) URL, its lowercase host
/// matches one of the domain patterns, and its path starts with one of the
/// path prefixes (any path is accepted when no prefixes are configured).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileMatcher {
    domains: Vec<String>,
    path_prefixes: Vec<String>,
}

impl ProfileMatcher {
    pub fn new(domains: Vec<String>, path_prefixes: Vec<String>) -> Self {
        Self {
            domains: domains.into_iter().map(|d| d.to_lowercase()).collect(),
            path_prefixes,
        }
    }

    pub fn from_config(source: &SourceConfig) -> Self {
        Self::new(
            source.profile_domains.clone(),
            source.profile_path_prefixes.clone(),
        )
    }

    /// Returns the parsed profile URL if `href` qualifies
    pub fn match_href(&self, href: &str) -> Option<Url> {
        let url = Url::parse(href.trim()).ok()?;
        self.matches(&url).then_some(url)
    }

    pub fn matches(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        let Some(host) = extract_domain(url) else {
            return false;
        };

        if !self.domains.iter().any(|p| matches_wildcard(p, &host)) {
            return false;
        }

        self.path_prefixes.is_empty()
            || self
                .path_prefixes
                .iter()
                .any(|prefix| url.path().starts_with(prefix.as_str()))
    }
}

impl Default for ProfileMatcher {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}

/// Extracts the lowercase host of a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
