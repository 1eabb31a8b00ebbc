//! CrawlerBot main entry point
//!
//! This is the command-line interface for the CrawlerBot website crawler.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use crawlerbot::config::{
    load_config_with_hash, load_jobs, validate_job, Config, CrawlJob, OutputKind,
    DEFAULT_USER_AGENT,
};
use crawlerbot::output::OutputMaterializer;
use crawlerbot::schedule::{RunMode, ScheduleRunner};
use crawlerbot::HttpFetcher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// CrawlerBot: A website crawler which can store scraped links in a SQLite
/// database or generate an XML sitemap.
///
/// CrawlerBot respects robots.txt, stays on the seed's origin and can
/// re-crawl its sites unattended at a fixed interval.
#[derive(Parser, Debug)]
#[command(name = "crawlerbot")]
#[command(disable_version_flag = true)]
#[command(about = "A website crawler which can store scraped links in a SQLite database or generate an XML sitemap", long_about = None)]
#[command(group(ArgGroup::new("kind").args(["db", "xml_sitemap", "kw_sitemap"])))]
struct Cli {
    /// Site to crawl (seed URL)
    #[arg(short, long, value_name = "SITE", conflicts_with = "jobs")]
    site: Option<String>,

    /// Output file (defaults to sitemap.xml, kw-sitemap.xml or links.db)
    #[arg(short, long, value_name = "OUT", conflicts_with = "jobs")]
    out: Option<PathBuf>,

    /// Store discovered links in a SQLite database
    #[arg(short, long)]
    db: bool,

    /// Generate an XML sitemap (default)
    #[arg(short = 'x', long)]
    xml_sitemap: bool,

    /// Generate a sitemap with title, description and keywords
    #[arg(short, long)]
    kw_sitemap: bool,

    /// Increase logging verbosity (-l, -ll, -lll)
    #[arg(short = 'l', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but fatal errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to TOML engine configuration
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// XML file listing crawl jobs
    #[arg(short, long, value_name = "JOBS")]
    jobs: Option<PathBuf>,

    /// Re-run the jobs at a fixed interval until interrupted
    #[arg(long)]
    daemon: bool,

    /// Seconds between daemon iterations (overrides the configuration)
    #[arg(long, value_name = "SECS", requires = "daemon", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Print the user agent string and exit
    #[arg(short = 'v', long)]
    version: bool,

    /// Print program information and exit
    #[arg(short, long)]
    info: bool,
}

impl Cli {
    fn output_kind(&self) -> OutputKind {
        if self.db {
            OutputKind::LinkStore
        } else if self.kw_sitemap {
            OutputKind::KeywordedSitemap
        } else {
            OutputKind::Sitemap
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if cli.version {
        println!("{}", config.crawler.user_agent);
        return Ok(());
    }

    if cli.info || (cli.site.is_none() && cli.jobs.is_none()) {
        print_info();
        return Ok(());
    }

    let jobs = collect_jobs(&cli)?;
    let mode = select_mode(&cli, &config, jobs);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    });

    let fetcher = HttpFetcher::from_config(&config.crawler).context("Failed to build HTTP client")?;
    let mut runner = ScheduleRunner::new(
        Arc::new(fetcher),
        OutputMaterializer::filesystem(),
        config.crawler.clone(),
    )
    .with_shutdown(shutdown_rx);

    let report = runner.run(mode).await;
    tracing::info!(
        "Finished after {} iterations ({} jobs run)",
        report.iterations,
        report.jobs_run()
    );

    match report.failures() {
        0 => Ok(()),
        failed => bail!("{} of {} jobs failed", failed, report.jobs_run()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("error"),
            1 => EnvFilter::new("crawlerbot=info,error"),
            2 => EnvFilter::new("crawlerbot=debug,warn"),
            _ => EnvFilter::new("crawlerbot=trace,info"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the job list from `--jobs` or `--site`
fn collect_jobs(cli: &Cli) -> anyhow::Result<Vec<CrawlJob>> {
    if let Some(path) = &cli.jobs {
        let jobs = load_jobs(path)
            .with_context(|| format!("Failed to load jobs from {}", path.display()))?;
        if jobs.is_empty() {
            bail!("{} lists no jobs", path.display());
        }
        tracing::info!("Loaded {} jobs from {}", jobs.len(), path.display());
        return Ok(jobs);
    }

    let site = cli.site.clone().unwrap_or_default();
    let job = CrawlJob::new(site, cli.output_kind(), cli.out.clone());
    validate_job(&job)?;
    Ok(vec![job])
}

fn select_mode(cli: &Cli, config: &Config, mut jobs: Vec<CrawlJob>) -> RunMode {
    if cli.daemon {
        let interval = cli
            .interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.daemon.interval());
        return RunMode::Daemon {
            jobs,
            interval,
            max_iterations: config.daemon.max_iterations,
        };
    }

    if jobs.len() == 1 {
        if let Some(job) = jobs.pop() {
            return RunMode::Single(job);
        }
    }
    RunMode::Batch(jobs)
}

fn print_info() {
    println!("CrawlerBot {}", env!("CARGO_PKG_VERSION"));
    println!("A website crawler which can store scraped links in a SQLite database");
    println!("or generate an XML sitemap.");
    println!();
    println!("User agent: {}", DEFAULT_USER_AGENT);
    println!("Source: https://github.com/stpettersens/crawlerbot");
    println!();
    println!("Run with --help for usage.");
}
