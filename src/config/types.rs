use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Robots.txt agent token this crawler answers to
pub const DEFAULT_ROBOTS_AGENT: &str = "CrawlerBot";

/// User-Agent header sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; CrawlerBot/1.0; +https://github.com/stpettersens/crawlerbot)";

/// Default pause between daemon iterations (two hours)
pub const DEFAULT_INTERVAL_SECS: u64 = 7200;

/// Main configuration structure for CrawlerBot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Agent token matched against `User-agent:` lines in robots.txt
    #[serde(rename = "robots-agent", default = "default_robots_agent")]
    pub robots_agent: String,

    /// Value of the User-Agent header
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum time between two requests to the site (milliseconds)
    #[serde(rename = "request-delay-ms", default)]
    pub request_delay_ms: u64,

    /// Seed the frontier from sitemaps advertised in robots.txt
    #[serde(rename = "follow-sitemaps", default = "default_true")]
    pub follow_sitemaps: bool,

    /// Keep draining when a non-seed page fails to fetch
    #[serde(rename = "tolerate-page-errors", default)]
    pub tolerate_page_errors: bool,
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            robots_agent: default_robots_agent(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            follow_sitemaps: true,
            tolerate_page_errors: false,
        }
    }
}

/// Recurring execution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Seconds to sleep between iterations
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Stop after this many iterations; run until shutdown when unset
    #[serde(rename = "max-iterations", default)]
    pub max_iterations: Option<u32>,
}

impl DaemonConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_iterations: None,
        }
    }
}

fn default_robots_agent() -> String {
    DEFAULT_ROBOTS_AGENT.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_true() -> bool {
    true
}

/// The artifact a crawl job produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Plain XML sitemap
    Sitemap,
    /// Sitemap carrying title, description and keywords per entry
    KeywordedSitemap,
    /// SQLite link store
    LinkStore,
}

impl OutputKind {
    /// Parses the job-file spelling of an output kind
    pub fn from_job_type(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sitemap" => Some(Self::Sitemap),
            "kw-sitemap" => Some(Self::KeywordedSitemap),
            "db" => Some(Self::LinkStore),
            _ => None,
        }
    }

    pub fn as_job_type(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
            Self::KeywordedSitemap => "kw-sitemap",
            Self::LinkStore => "db",
        }
    }

    /// Destination used when a job does not name one
    pub fn default_destination(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap.xml",
            Self::KeywordedSitemap => "kw-sitemap.xml",
            Self::LinkStore => "links.db",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_job_type())
    }
}

/// One site to crawl and where its output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    /// Seed URL; its origin scopes the crawl
    pub site: String,
    pub output_kind: OutputKind,
    pub destination: PathBuf,
}

impl CrawlJob {
    pub fn new(site: impl Into<String>, output_kind: OutputKind, destination: Option<PathBuf>) -> Self {
        let destination =
            destination.unwrap_or_else(|| PathBuf::from(output_kind.default_destination()));
        Self {
            site: site.into(),
            output_kind,
            destination,
        }
    }
}
