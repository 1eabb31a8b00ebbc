//! Batch job file parsing
//!
//! A job file lists the sites to crawl in batch or daemon mode:
//!
//! ```xml
//! <jobs>
//!   <job site="https://a.example">
//!     <type>sitemap</type>
//!     <out>a-sitemap.xml</out>
//!   </job>
//!   <job site="https://b.example">
//!     <type>db</type>
//!   </job>
//! </jobs>
//! ```

use crate::config::types::{CrawlJob, OutputKind};
use crate::config::validation::validate_job;
use crate::ConfigError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};

/// Loads and validates a job file
pub fn load_jobs(path: &Path) -> Result<Vec<CrawlJob>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_jobs(&content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobField {
    Type,
    Out,
}

#[derive(Debug, Default)]
struct PendingJob {
    site: String,
    job_type: Option<String>,
    out: Option<String>,
}

impl PendingJob {
    fn finish(self) -> Result<CrawlJob, ConfigError> {
        let job_type = self.job_type.ok_or_else(|| {
            ConfigError::JobFile(format!("Job for '{}' is missing a <type>", self.site))
        })?;

        let kind = OutputKind::from_job_type(&job_type).ok_or_else(|| {
            ConfigError::JobFile(format!(
                "Job for '{}' has unknown type '{}' (expected sitemap, kw-sitemap or db)",
                self.site, job_type
            ))
        })?;

        let destination = self
            .out
            .filter(|out| !out.trim().is_empty())
            .map(PathBuf::from);

        Ok(CrawlJob::new(self.site, kind, destination))
    }
}

/// Parses job entries from job-file XML text
pub fn parse_jobs(xml: &str) -> Result<Vec<CrawlJob>, ConfigError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut jobs = Vec::new();
    let mut current: Option<PendingJob> = None;
    let mut field: Option<JobField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"job" => current = Some(start_job(&e)?),
                b"type" if current.is_some() => field = Some(JobField::Type),
                b"out" if current.is_some() => field = Some(JobField::Out),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"job" {
                    jobs.push(start_job(&e)?.finish()?);
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(job), Some(f)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_err(|err| ConfigError::JobFile(err.to_string()))?
                        .trim()
                        .to_string();
                    match f {
                        JobField::Type => job.job_type = Some(text),
                        JobField::Out => job.out = Some(text),
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"job" => {
                    if let Some(job) = current.take() {
                        jobs.push(job.finish()?);
                    }
                    field = None;
                }
                b"type" | b"out" => field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConfigError::JobFile(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err(ConfigError::JobFile("Unterminated <job> element".to_string()));
    }

    for job in &jobs {
        validate_job(job)?;
    }

    Ok(jobs)
}

fn start_job(e: &BytesStart<'_>) -> Result<PendingJob, ConfigError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConfigError::JobFile(err.to_string()))?;
        if attr.key.local_name().as_ref() == b"site" {
            let site = attr
                .unescape_value()
                .map_err(|err| ConfigError::JobFile(err.to_string()))?
                .trim()
                .to_string();
            return Ok(PendingJob {
                site,
                ..PendingJob::default()
            });
        }
    }

    Err(ConfigError::JobFile(
        "<job> element is missing its site attribute".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jobs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<jobs>
  <job site="https://a.example">
    <type>sitemap</type>
    <out>a-sitemap.xml</out>
  </job>
  <job site="https://b.example">
    <type>kw-sitemap</type>
    <out>b.xml</out>
  </job>
  <job site="https://c.example">
    <type>db</type>
  </job>
</jobs>"#;

        let jobs = parse_jobs(xml).unwrap();
        assert_eq!(jobs.len(), 3);

        assert_eq!(jobs[0].site, "https://a.example");
        assert_eq!(jobs[0].output_kind, OutputKind::Sitemap);
        assert_eq!(jobs[0].destination, PathBuf::from("a-sitemap.xml"));

        assert_eq!(jobs[1].output_kind, OutputKind::KeywordedSitemap);

        assert_eq!(jobs[2].output_kind, OutputKind::LinkStore);
        assert_eq!(jobs[2].destination, PathBuf::from("links.db"));
    }

    #[test]
    fn test_parse_jobs_preserves_order() {
        let xml = r#"<jobs>
            <job site="https://z.example"><type>db</type><out>z.db</out></job>
            <job site="https://a.example"><type>db</type><out>a.db</out></job>
        </jobs>"#;
        let jobs = parse_jobs(xml).unwrap();
        assert_eq!(jobs[0].site, "https://z.example");
        assert_eq!(jobs[1].site, "https://a.example");
    }

    #[test]
    fn test_missing_site_attribute() {
        let xml = r#"<jobs><job><type>db</type></job></jobs>"#;
        assert!(matches!(parse_jobs(xml), Err(ConfigError::JobFile(_))));
    }

    #[test]
    fn test_missing_type() {
        let xml = r#"<jobs><job site="https://a.example"><out>x.xml</out></job></jobs>"#;
        assert!(matches!(parse_jobs(xml), Err(ConfigError::JobFile(_))));
    }

    #[test]
    fn test_self_closing_job_needs_type() {
        let xml = r#"<jobs><job site="https://a.example"/></jobs>"#;
        assert!(parse_jobs(xml).is_err());
    }

    #[test]
    fn test_unknown_type() {
        let xml = r#"<jobs><job site="https://a.example"><type>csv</type></job></jobs>"#;
        assert!(matches!(parse_jobs(xml), Err(ConfigError::JobFile(_))));
    }

    #[test]
    fn test_invalid_site_rejected() {
        let xml = r#"<jobs><job site="not a url"><type>db</type></job></jobs>"#;
        assert!(matches!(parse_jobs(xml), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_empty_job_list() {
        let jobs = parse_jobs("<jobs></jobs>").unwrap();
        assert!(jobs.is_empty());
    }
}
