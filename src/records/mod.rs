//! Typed records flowing through the pipeline
//!
//! # Components
//!
//! - `CompanyRecord`: one listing entry, keyed by slug
//! - `FounderRecord`: one founder parsed from a detail page
//! - `FetchResult`: outcome of a detail fetch (success, skipped, failure)
//! - `OutputRow`: one exported CSV row

mod company;
mod fetch;
mod founder;
mod row;

pub use company::CompanyRecord;
pub use fetch::{FetchFailure, FetchResult, SkipReason};
pub use founder::FounderRecord;
pub use row::{OutputRow, CSV_HEADER};
