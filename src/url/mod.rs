//! URL handling module
//!
//! This module provides wildcard domain matching, recognition of founder
//! profile links, and construction of company detail-page URLs.

mod matcher;
mod profile;

pub use matcher::matches_wildcard;
pub use profile::{extract_domain, ProfileMatcher};

use url::{ParseError, Url};

/// Builds the canonical detail-page URL `{base_url}/companies/{slug}`
///
/// The slug is appended as a single, percent-encoded path segment, so a slug
/// can never escape the `companies/` path.
///
/// # Examples
///
/// ```
/// use yc_founders::url::detail_url;
///
/// let url = detail_url("https://www.ycombinator.com", "acme-inc").unwrap();
/// assert_eq!(url.as_str(), "https://www.ycombinator.com/companies/acme-inc");
/// ```
pub fn detail_url(base_url: &str, slug: &str) -> Result<Url, ParseError> {
    let mut url = Url::parse(base_url)?;

    url.path_segments_mut()
        .map_err(|_| ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push("companies")
        .push(slug);

    Ok(url)
}
