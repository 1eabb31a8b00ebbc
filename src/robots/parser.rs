//! Robots.txt parser implementation
//!
//! Tokenisation is delegated to the robotstxt crate's callback parser; this
//! module only decides which lines apply to our agent.

use robotstxt::{parse_robotstxt, RobotsParseHandler};
use url::Url;

/// Directives robots.txt imposes on one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsDirectives {
    /// Absolute URL prefixes the agent may not fetch
    pub disallowed: Vec<String>,

    /// Sitemap locations advertised anywhere in the document
    pub sitemaps: Vec<String>,

    /// `Disallow: /` applies to the agent; nothing may be crawled
    pub terminate: bool,
}

impl RobotsDirectives {
    /// Returns true if no disallowed prefix covers the URL
    pub fn is_allowed(&self, url: &Url) -> bool {
        let url = url.as_str();
        !self
            .disallowed
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
    }
}

/// Position of the handler relative to the honored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    /// No matching `User-agent` line seen yet
    Searching,
    /// Inside the honored record; `rules_seen` tracks whether it has rules yet
    Honoring { rules_seen: bool },
    /// The honored record has ended
    Closed,
}

struct DirectiveCollector<'a> {
    agent: String,
    origin: &'a Url,
    state: RecordState,
    directives: RobotsDirectives,
}

impl<'a> DirectiveCollector<'a> {
    fn new(agent: &str, origin: &'a Url) -> Self {
        Self {
            agent: agent.to_ascii_lowercase(),
            origin,
            state: RecordState::Searching,
            directives: RobotsDirectives::default(),
        }
    }

    fn agent_matches(&self, user_agent: &str) -> bool {
        let user_agent = user_agent.trim();
        user_agent == "*" || user_agent.eq_ignore_ascii_case(&self.agent)
    }

    /// Returns true if the line belongs to the honored record
    fn in_record(&mut self) -> bool {
        match self.state {
            RecordState::Honoring { .. } => {
                self.state = RecordState::Honoring { rules_seen: true };
                true
            }
            _ => false,
        }
    }
}

impl RobotsParseHandler for DirectiveCollector<'_> {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, line_num: u32, user_agent: &str) {
        match self.state {
            RecordState::Searching if self.agent_matches(user_agent) => {
                tracing::info!(
                    "Honoring robots.txt record for {:?} (line {})",
                    user_agent,
                    line_num
                );
                self.state = RecordState::Honoring { rules_seen: false };
            }
            // Consecutive agent lines share one record
            RecordState::Honoring { rules_seen: true } => {
                self.state = RecordState::Closed;
            }
            _ => {}
        }
    }

    fn handle_allow(&mut self, line_num: u32, value: &str) {
        if self.in_record() && !value.trim().is_empty() {
            tracing::info!("robots.txt allows {} (line {})", value.trim(), line_num);
        }
    }

    fn handle_disallow(&mut self, line_num: u32, value: &str) {
        if self.directives.terminate || !self.in_record() {
            return;
        }

        let value = value.trim();
        if value.is_empty() {
            tracing::debug!("Skipping empty Disallow on line {}", line_num);
            return;
        }

        if value == "/" {
            tracing::info!("robots.txt disallows the whole site (line {})", line_num);
            self.directives.terminate = true;
            self.state = RecordState::Closed;
            return;
        }

        match self.origin.join(value) {
            Ok(prefix) => {
                tracing::info!("robots.txt disallows {}", prefix);
                self.directives.disallowed.push(prefix.to_string());
            }
            Err(e) => tracing::debug!("Skipping Disallow {:?} on line {}: {}", value, line_num, e),
        }
    }

    fn handle_sitemap(&mut self, line_num: u32, value: &str) {
        let value = value.trim();
        if value.is_empty() || self.directives.terminate {
            return;
        }
        tracing::debug!("robots.txt advertises sitemap {} (line {})", value, line_num);
        self.directives.sitemaps.push(value.to_string());
    }

    fn handle_unknown_action(&mut self, line_num: u32, action: &str, _value: &str) {
        // Still a rule line: a following User-agent starts a new record
        self.in_record();
        tracing::trace!("Ignoring robots.txt directive {:?} on line {}", action, line_num);
    }
}

/// Evaluates a robots.txt document for one agent
///
/// Only the first record naming the agent (case-insensitively) or `*` is
/// honored. Its `Disallow` values are resolved against `origin`; `Allow`
/// lines are logged only. `Sitemap` lines are collected from every record.
///
/// # Example
///
/// ```
/// use crawlerbot::robots::evaluate;
/// use url::Url;
///
/// let origin = Url::parse("https://site.example/").unwrap();
/// let directives = evaluate("User-agent: *\nDisallow: /private\n", "CrawlerBot", &origin);
/// assert_eq!(directives.disallowed, vec!["https://site.example/private".to_string()]);
/// assert!(!directives.terminate);
/// ```
pub fn evaluate(document: &str, agent: &str, origin: &Url) -> RobotsDirectives {
    let mut collector = DirectiveCollector::new(agent, origin);
    parse_robotstxt(document, &mut collector);
    collector.directives
}
