//! External sitemap handling
//!
//! Sitemaps advertised in robots.txt can seed the frontier. Only one level is
//! read: child sitemaps of an index are reported, not followed.

mod parser;

pub use parser::{parse, SitemapDocument, SitemapError};
