//! Output module for rows, CSV export and run reports
//!
//! This module handles:
//! - Joining companies with their founders into output rows
//! - Writing the CSV file atomically
//! - Recording and printing run statistics

mod aggregate;
mod csv;
pub mod stats;

pub use aggregate::aggregate;
pub use csv::{export_csv, resolve_output_path, write_rows, DEFAULT_OUTPUT_DIR};
pub use stats::{print_report, RunReport};
