//! Per-run crawl state
//!
//! One `CrawlState` is created for every crawl run and owned by it; nothing
//! in it outlives the run or is shared with another one.

use crate::crawler::Frontier;
use crate::state::PageFacts;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Everything one crawl run accumulates
#[derive(Debug, Clone)]
pub struct CrawlState {
    site_origin: Url,
    frontier: Frontier,
    nofollow_active: bool,
    facts: BTreeMap<Url, PageFacts>,
    failed: BTreeSet<Url>,
}

impl CrawlState {
    /// Creates state for a run scoped to `site_origin`
    ///
    /// `disallowed_prefixes` are absolute URL prefixes from robots.txt.
    pub fn new(site_origin: Url, disallowed_prefixes: Vec<String>) -> Self {
        Self {
            site_origin,
            frontier: Frontier::new(disallowed_prefixes),
            nofollow_active: false,
            facts: BTreeMap::new(),
            failed: BTreeSet::new(),
        }
    }

    pub fn site_origin(&self) -> &Url {
        &self.site_origin
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// True while the page being processed carries a meta nofollow
    pub fn nofollow_active(&self) -> bool {
        self.nofollow_active
    }

    /// Records a fetched page and returns the links to offer the frontier
    ///
    /// Marks the page visited, stores its facts and sets the page-scoped
    /// nofollow signal from them.
    pub fn record_page(&mut self, url: Url, facts: PageFacts) -> Vec<Url> {
        self.frontier.record_visited(&url);
        self.nofollow_active = facts.nofollow;

        let to_offer = if self.nofollow_active {
            Vec::new()
        } else {
            facts.followable_links().cloned().collect()
        };

        self.facts.insert(url, facts);
        to_offer
    }

    /// Clears the page-scoped nofollow signal once a page is done
    pub fn finish_page(&mut self) {
        self.nofollow_active = false;
    }

    /// Records a page whose fetch failed; it counts as visited but is never emitted
    pub fn record_failure(&mut self, url: Url) {
        self.frontier.record_visited(&url);
        self.failed.insert(url);
    }

    pub fn facts(&self, url: &Url) -> Option<&PageFacts> {
        self.facts.get(url)
    }

    pub fn visited(&self) -> &BTreeSet<Url> {
        self.frontier.visited()
    }

    pub fn is_failed(&self, url: &Url) -> bool {
        self.failed.contains(url)
    }

    /// Number of pages with recorded facts
    pub fn pages_recorded(&self) -> usize {
        self.facts.len()
    }

    /// True if any page in the run declared keywords
    pub fn any_keywords(&self) -> bool {
        self.facts.values().any(|f| f.keywords.is_some())
    }

    /// Visited URLs eligible for output, in sorted order
    ///
    /// Excludes disallowed, failed and `noindex` pages.
    pub fn eligible_urls(&self) -> Vec<&Url> {
        self.visited()
            .iter()
            .filter(|url| !self.frontier.is_disallowed(url))
            .filter(|url| !self.is_failed(url))
            .filter(|url| !self.facts.get(*url).map(|f| f.no_index).unwrap_or(false))
            .collect()
    }
}
