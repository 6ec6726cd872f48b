//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key is optional; command-line flags override file values and
//! the merged result is validated once before any network activity.
//!
//! # Example
//!
//! ```no_run
//! use yc_founders::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("yc-founders.toml")).unwrap();
//! println!("Collecting at least {} companies", config.scraper.limit);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, OutputConfig, ScraperConfig, SourceConfig, UserAgentConfig, DEFAULT_BASE_URL,
    DEFAULT_LIST_URL,
};

pub use parser::{load_config, parse_config, read_config_with_hash};
pub use validation::validate;
