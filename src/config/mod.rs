//! Configuration module for CrawlerBot
//!
//! This module handles the optional TOML engine configuration and the XML
//! batch job file.
//!
//! # Example
//!
//! ```no_run
//! use crawlerbot::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawlerbot.toml")).unwrap();
//! println!("Daemon interval: {}s", config.daemon.interval_secs);
//! ```

mod jobs;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlJob, CrawlerConfig, DaemonConfig, OutputKind, DEFAULT_INTERVAL_SECS,
    DEFAULT_ROBOTS_AGENT, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use jobs::{load_jobs, parse_jobs};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate_job, validate_site};
