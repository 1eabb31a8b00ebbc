//! Crawl frontier with deduplication and robots filtering
//!
//! The frontier owns the "seen" invariant for a run:
//! - every allowed URL is handed out at most once
//! - a URL under a disallowed prefix is never handed out
//! - a rejected URL is remembered and never re-evaluated
//! - once drained, the frontier stays closed for the rest of the run
//!
//! URLs are handed out breadth-first so runs are reproducible.

use std::collections::{BTreeSet, HashSet, VecDeque};
use url::Url;

/// Deduplicated queue of URLs still to visit plus the visited set
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    /// Absolute URL prefixes robots.txt forbids
    disallowed: Vec<String>,

    /// URLs waiting to be fetched, in discovery order
    pending: VecDeque<Url>,

    /// URLs pending or in flight (handed out but not yet recorded)
    queued: HashSet<Url>,

    /// URLs fully processed
    visited: BTreeSet<Url>,

    /// URLs refused because of a disallow rule
    rejected: HashSet<Url>,

    /// Set once `next_url` has found nothing left
    exhausted: bool,
}

impl Frontier {
    /// Creates an empty frontier guarded by the given disallow prefixes
    pub fn new(disallowed: Vec<String>) -> Self {
        Self {
            disallowed,
            ..Self::default()
        }
    }

    /// Seeds the frontier with the starting URL
    ///
    /// Returns false if the seed itself is disallowed.
    pub fn seed(&mut self, url: Url) -> bool {
        self.offer(url)
    }

    /// Offers a candidate URL
    ///
    /// No-op (returns false) if the URL was already seen, is pending or in
    /// flight, was rejected before, falls under a disallowed prefix, or the
    /// frontier has been drained.
    pub fn offer(&mut self, url: Url) -> bool {
        if self.exhausted
            || self.visited.contains(&url)
            || self.queued.contains(&url)
            || self.rejected.contains(&url)
        {
            return false;
        }

        if self.is_disallowed(&url) {
            tracing::info!("Not following {} (disallowed by robots.txt)", url);
            self.rejected.insert(url);
            return false;
        }

        self.queued.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Hands out the next URL to fetch
    ///
    /// The URL stays reserved until `record_visited` is called, so it cannot
    /// be offered again while its fetch is in flight. Returns `None` once
    /// nothing is pending, after which the frontier is closed.
    pub fn next_url(&mut self) -> Option<Url> {
        if self.exhausted {
            return None;
        }

        match self.pending.pop_front() {
            Some(url) => Some(url),
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    /// Marks a URL as processed
    pub fn record_visited(&mut self, url: &Url) {
        self.queued.remove(url);
        self.visited.insert(url.clone());
    }

    /// Returns true if the URL falls under any disallowed prefix
    pub fn is_disallowed(&self, url: &Url) -> bool {
        let url = url.as_str();
        self.disallowed
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
    }

    pub fn visited(&self) -> &BTreeSet<Url> {
        &self.visited
    }

    /// Number of URLs waiting to be fetched
    pub fn frontier_size(&self) -> usize {
        self.pending.len()
    }
}
