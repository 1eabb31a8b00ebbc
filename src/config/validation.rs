use crate::config::types::{Config, CrawlJob, CrawlerConfig, DaemonConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the per-request timeout, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_daemon_config(&config.daemon)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.robots_agent.is_empty() {
        return Err(ConfigError::Validation(
            "robots-agent cannot be empty".to_string(),
        ));
    }

    if !config
        .robots_agent
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "robots-agent must contain only alphanumeric characters and hyphens, got '{}'",
            config.robots_agent
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates daemon configuration
fn validate_daemon_config(config: &DaemonConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "interval-secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    if config.max_iterations == Some(0) {
        return Err(ConfigError::Validation(
            "max-iterations must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates a crawl job before it is scheduled
pub fn validate_job(job: &CrawlJob) -> Result<(), ConfigError> {
    validate_site(&job.site)?;

    if job.destination.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!(
            "Job for '{}' has an empty output destination",
            job.site
        )));
    }

    Ok(())
}

/// Validates a seed site URL
pub fn validate_site(site: &str) -> Result<(), ConfigError> {
    let url = Url::parse(site)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", site, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Site URL '{}' must use http or https",
            site
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site URL '{}' has no host",
            site
        )));
    }

    Ok(())
}
