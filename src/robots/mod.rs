//! Robots.txt handling module
//!
//! This module evaluates a site's robots.txt for the crawler's agent token,
//! producing the disallowed prefixes and advertised sitemaps for one run.

mod parser;

pub use parser::{evaluate, RobotsDirectives};

use url::Url;

/// Returns the robots.txt location for a site origin
pub fn robots_url(origin: &Url) -> Url {
    let mut url = origin.clone();
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_url() {
        let origin = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(robots_url(&origin).as_str(), "http://127.0.0.1:8080/robots.txt");
    }
}
