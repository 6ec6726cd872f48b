//! Run statistics
//!
//! This module accumulates per-company outcomes into a [`RunReport`] and
//! prints it at the end of a run.

use crate::collector::{CompanyOutcome, LimiterStats, Outcome};
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one collection run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Companies selected from the listing
    pub requested: usize,

    /// Companies with a recorded outcome
    pub companies: usize,

    /// Detail pages fetched and parsed
    pub succeeded: usize,

    /// Detail pages skipped (not found)
    pub skipped: usize,

    /// Detail pages that failed after retries; excluded from the output
    pub failed: usize,

    /// Parsed pages without the expected founder structure
    pub parse_anomalies: usize,

    /// Companies with at least one founder
    pub companies_with_founders: usize,

    /// Founders found across all companies
    pub total_founders: usize,

    /// Founders with a profile URL
    pub founders_with_profile: usize,

    /// Data rows in the output file
    pub rows_written: usize,

    /// HTTP requests issued, retries included
    pub requests: u64,

    /// Retries after transient failures
    pub retries: u64,

    /// Where the CSV was written
    pub output_path: Option<PathBuf>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// Counts one company's outcome
    pub fn record(&mut self, outcome: &CompanyOutcome) {
        self.companies += 1;

        match &outcome.outcome {
            Outcome::Parsed { anomaly } => {
                self.succeeded += 1;
                if *anomaly {
                    self.parse_anomalies += 1;
                }
            }
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }

        if !outcome.founders.is_empty() {
            self.companies_with_founders += 1;
        }
        self.total_founders += outcome.founders.len();
        self.founders_with_profile += outcome.founders.iter().filter(|f| f.has_profile()).count();
    }

    /// Fills in the fields known only once the file is written
    pub fn finish(
        &mut self,
        rows_written: usize,
        limiter: LimiterStats,
        output_path: PathBuf,
        elapsed: Duration,
    ) {
        self.rows_written = rows_written;
        self.requests = limiter.requests;
        self.retries = limiter.retries;
        self.output_path = Some(output_path);
        self.elapsed = elapsed;
    }

    /// Companies present in the output (succeeded or skipped)
    pub fn exported_companies(&self) -> usize {
        self.succeeded + self.skipped
    }

    /// Share of exported companies with at least one founder, in percent
    pub fn founder_coverage(&self) -> f64 {
        percentage(self.companies_with_founders, self.exported_companies())
    }

    /// Share of founders with a profile URL, in percent
    pub fn profile_coverage(&self) -> f64 {
        percentage(self.founders_with_profile, self.total_founders)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &RunReport) {
    println!("=== Run Summary ===\n");

    println!("Companies:");
    println!("  Requested: {}", report.requested);
    println!("  Detail pages parsed: {}", report.succeeded);
    println!("  Skipped (not found): {}", report.skipped);
    println!("  Failed (excluded): {}", report.failed);
    if report.parse_anomalies > 0 {
        println!("  Parse anomalies: {}", report.parse_anomalies);
    }
    println!();

    println!("Founders:");
    println!(
        "  Companies with founders: {} ({:.1}%)",
        report.companies_with_founders,
        report.founder_coverage()
    );
    println!("  Total founders: {}", report.total_founders);
    println!(
        "  With profile URL: {} ({:.1}%)",
        report.founders_with_profile,
        report.profile_coverage()
    );
    println!();

    println!("Requests:");
    println!("  Issued: {}", report.requests);
    println!("  Retries: {}", report.retries);
    println!();

    match &report.output_path {
        Some(path) => println!("Wrote {} rows to {}", report.rows_written, path.display()),
        None => println!("No output written"),
    }
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
}
