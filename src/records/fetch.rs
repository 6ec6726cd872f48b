use std::fmt;

/// Why a detail fetch was skipped rather than attempted or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The detail page returned HTTP 404
    NotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
        }
    }
}

/// Why a detail fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Description of the last error seen
    pub reason: String,

    /// Attempts made before giving up
    pub attempts: u32,

    /// True when the error was not retryable (4xx, DNS failure)
    pub permanent: bool,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.permanent { "permanent" } else { "transient" };
        write!(
            f,
            "{} ({} failure after {} attempt{})",
            self.reason,
            kind,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" }
        )
    }
}

/// Outcome of fetching one company's detail page
///
/// Only `Success` is parsed. A `Skipped` company still gets a placeholder
/// output row; a `Failure` is excluded from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Success(String),
    Skipped(SkipReason),
    Failure(FetchFailure),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FetchResult::Skipped(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchResult::Failure(_))
    }

    /// Short label used in logs and the run report
    pub fn label(&self) -> &'static str {
        match self {
            FetchResult::Success(_) => "success",
            FetchResult::Skipped(_) => "skipped",
            FetchResult::Failure(_) => "failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(FetchResult::Success(String::new()).is_success());
        assert!(FetchResult::Skipped(SkipReason::NotFound).is_skipped());

        let failure = FetchResult::Failure(FetchFailure {
            reason: "HTTP 503".to_string(),
            attempts: 3,
            permanent: false,
        });
        assert!(failure.is_failure());
        assert_eq!(failure.label(), "failure");
    }

    #[test]
    fn test_failure_display() {
        let failure = FetchFailure {
            reason: "HTTP 403".to_string(),
            attempts: 1,
            permanent: true,
        };
        assert_eq!(
            failure.to_string(),
            "HTTP 403 (permanent failure after 1 attempt)"
        );
    }
}
