//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML parsing into per-page facts
//! - The deduplicating, robots-filtered frontier
//! - Overall crawl coordination for one site

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlOutcome, CrawlRun, TerminationReason};
pub use fetcher::{
    build_http_client, request_headers, FetchError, FetchResponse, Fetcher, HttpFetcher,
};
pub use frontier::Frontier;
pub use parser::extract;
