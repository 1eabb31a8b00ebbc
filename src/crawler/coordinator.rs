//! Crawler coordinator - one crawl of one site
//!
//! A [`CrawlRun`] walks the phase machine in [`RunPhase`]:
//! - Fetch and evaluate robots.txt for the configured agent
//! - Optionally collect internal URLs from advertised sitemaps
//! - Fetch the seed, then drain the frontier page by page
//! - Hand the accumulated [`CrawlState`] back for materialization
//!
//! Every request carries the configured identifying `User-Agent`.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{request_headers, FetchError, FetchResponse, Fetcher};
use crate::crawler::parser::extract;
use crate::robots::{evaluate, robots_url, RobotsDirectives};
use crate::state::{CrawlState, RunPhase};
use crate::url::{resolve_reference, site_origin};
use crate::{sitemap, CrawlError};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Why a run ended without crawling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// robots.txt disallows `/` for our agent
    DisallowAll,
    /// The seed falls under a disallowed prefix
    SeedDisallowed,
}

/// Result of a run that did not fail
#[derive(Debug)]
pub enum CrawlOutcome {
    /// Frontier drained; state ready for output
    Completed(CrawlState),

    /// Robots policy forbade the crawl; nothing was visited
    PolicyTerminated {
        site_origin: Url,
        reason: TerminationReason,
    },
}

impl CrawlOutcome {
    /// Returns the state of a completed run
    pub fn into_state(self) -> Option<CrawlState> {
        match self {
            Self::Completed(state) => Some(state),
            Self::PolicyTerminated { .. } => None,
        }
    }
}

/// One crawl of one site
pub struct CrawlRun {
    fetcher: Arc<dyn Fetcher>,
    config: CrawlerConfig,
    headers: HeaderMap,
    seed: Url,
    origin: Url,
    phase: RunPhase,
    requests_made: usize,
}

impl CrawlRun {
    /// Prepares a run for `site`
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Url` if `site` is not an absolute http(s) URL.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: CrawlerConfig, site: &str) -> crate::Result<Self> {
        let origin = site_origin(site)?;
        let seed = resolve_reference(site, &origin)?;
        let headers = request_headers(&config.user_agent);

        Ok(Self {
            fetcher,
            config,
            headers,
            seed,
            origin,
            phase: RunPhase::FetchingRobots,
            requests_made: 0,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn site_origin(&self) -> &Url {
        &self.origin
    }

    fn transition(&mut self, next: RunPhase) -> crate::Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("{}: {} -> {}", self.origin, self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Moves to `Failed` and converts the cause
    fn fail(&mut self, cause: impl Into<CrawlError>) -> CrawlError {
        if self.phase.can_transition_to(RunPhase::Failed) {
            self.phase = RunPhase::Failed;
        }
        cause.into()
    }

    fn terminate(&mut self, reason: TerminationReason) -> crate::Result<CrawlOutcome> {
        self.transition(RunPhase::Terminated)?;
        tracing::info!("Not crawling {} ({:?})", self.origin, reason);
        Ok(CrawlOutcome::PolicyTerminated {
            site_origin: self.origin.clone(),
            reason,
        })
    }

    /// Executes the run to a terminal phase
    ///
    /// # Errors
    ///
    /// Fetch failures on robots.txt or the seed are fatal. Failures while
    /// draining are fatal unless `tolerate-page-errors` is set.
    pub async fn execute(&mut self) -> crate::Result<CrawlOutcome> {
        if self.phase != RunPhase::FetchingRobots {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: RunPhase::FetchingRobots,
            });
        }

        let start_time = Instant::now();
        tracing::info!("Starting crawl of {}", self.seed);

        // Robots
        let robots_location = robots_url(&self.origin);
        let robots = match self.fetch(&robots_location).await {
            Ok(response) => response.text(),
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(RunPhase::EvaluatingRobots)?;
        let directives = evaluate(&robots, &self.config.robots_agent, &self.origin);
        if directives.terminate {
            return self.terminate(TerminationReason::DisallowAll);
        }
        let sitemap_urls = self.collect_sitemap_urls(&directives).await;
        let mut state = CrawlState::new(self.origin.clone(), directives.disallowed);

        // Seed
        self.transition(RunPhase::FetchingSeed)?;
        if !state.frontier_mut().seed(self.seed.clone()) {
            return self.terminate(TerminationReason::SeedDisallowed);
        }
        for url in sitemap_urls {
            if state.frontier_mut().offer(url.clone()) {
                tracing::info!("Queued {} from sitemap", url);
            }
        }
        if let Some(seed) = state.frontier_mut().next_url() {
            match self.fetch(&seed).await {
                Ok(response) => self.process_page(&mut state, seed, &response),
                Err(e) => return Err(self.fail(e)),
            }
        }

        // Drain
        self.transition(RunPhase::Draining)?;
        let mut pages_crawled = 1usize;

        while let Some(url) = state.frontier_mut().next_url() {
            match self.fetch(&url).await {
                Ok(response) => self.process_page(&mut state, url, &response),
                Err(e) if self.config.tolerate_page_errors => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    state.record_failure(url);
                }
                Err(e) => return Err(self.fail(e)),
            }

            pages_crawled += 1;

            if pages_crawled % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = pages_crawled as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    pages_crawled,
                    state.frontier().frontier_size(),
                    rate
                );
            }
        }

        self.transition(RunPhase::Completed)?;
        tracing::info!(
            "Crawl of {} completed: {} pages crawled, {} recorded in {:?}",
            self.origin,
            pages_crawled,
            state.pages_recorded(),
            start_time.elapsed()
        );

        Ok(CrawlOutcome::Completed(state))
    }

    /// Extracts a fetched page, records it and offers its links
    fn process_page(&self, state: &mut CrawlState, url: Url, response: &FetchResponse) {
        if response.final_url != url.as_str() {
            tracing::debug!("{} redirected to {}", url, response.final_url);
        }

        let facts = extract(&response.text(), &url, &self.origin);
        tracing::info!(
            "Processed {} (HTTP {}, {} links)",
            response.final_url,
            response.status,
            facts.links.len()
        );

        let label = url.to_string();
        let to_offer = state.record_page(url, facts);
        if state.nofollow_active() {
            tracing::info!("Not following links on {} (meta nofollow)", label);
        }
        for link in to_offer {
            if state.frontier_mut().offer(link.clone()) {
                tracing::info!("Queued {}", link);
            }
        }
        state.finish_page();
    }

    /// Fetches every advertised sitemap and returns its internal leaf URLs
    ///
    /// Failures here are warnings; the crawl goes on without the sitemap.
    async fn collect_sitemap_urls(&mut self, directives: &RobotsDirectives) -> Vec<Url> {
        let mut urls = Vec::new();
        if !self.config.follow_sitemaps {
            return urls;
        }

        for location in &directives.sitemaps {
            let Ok(location_url) = Url::parse(location) else {
                tracing::warn!("Ignoring malformed sitemap location {:?}", location);
                continue;
            };

            let document = match self.fetch(&location_url).await {
                Ok(response) => response.text(),
                Err(e) => {
                    tracing::warn!("Failed to fetch sitemap {}: {}", location, e);
                    continue;
                }
            };

            let parsed = match sitemap::parse(&document) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Failed to parse sitemap {}: {}", location, e);
                    continue;
                }
            };

            for child in &parsed.child_sitemaps {
                tracing::info!("Sitemap {} lists child sitemap {} (not followed)", location, child);
            }

            for leaf in &parsed.leaf_urls {
                match resolve_reference(leaf, &self.origin) {
                    Ok(url) => urls.push(url),
                    Err(_) => tracing::debug!("Skipping off-site sitemap entry {}", leaf),
                }
            }
        }

        urls
    }

    /// Issues one request, honouring the configured delay between requests
    async fn fetch(&mut self, url: &Url) -> Result<FetchResponse, FetchError> {
        let delay = self.config.request_delay();
        if self.requests_made > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.requests_made += 1;

        tracing::debug!("Fetching {}", url);
        self.fetcher.fetch(url.as_str(), &self.headers).await
    }
}
