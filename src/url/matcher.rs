/// Checks if a host matches a wildcard domain pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact match: "linkedin.com" matches only "linkedin.com"
/// 2. Wildcard match: "*.linkedin.com" matches:
///    - "linkedin.com" (the bare domain)
///    - "www.linkedin.com" (single subdomain)
///    - "uk.www.linkedin.com" (nested subdomains)
///
/// Hosts are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use yc_founders::url::matches_wildcard;
///
/// assert!(matches_wildcard("linkedin.com", "linkedin.com"));
/// assert!(!matches_wildcard("linkedin.com", "www.linkedin.com"));
///
/// assert!(matches_wildcard("*.linkedin.com", "linkedin.com"));
/// assert!(matches_wildcard("*.linkedin.com", "www.linkedin.com"));
/// assert!(!matches_wildcard("*.linkedin.com", "notlinkedin.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|rest| rest.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
