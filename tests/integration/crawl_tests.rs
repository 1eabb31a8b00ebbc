//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, down to the files written.

use crawlerbot::config::{parse_jobs, CrawlJob, CrawlerConfig, OutputKind, DEFAULT_USER_AGENT};
use crawlerbot::crawler::TerminationReason;
use crawlerbot::output::{Materialized, OutputMaterializer};
use crawlerbot::schedule::{JobOutcome, RunMode, ScheduleRunner};
use crawlerbot::HttpFetcher;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOM: &str = "\u{feff}";

/// Mounts an HTML page at `route`
async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn runner() -> ScheduleRunner {
    let config = CrawlerConfig::default();
    let fetcher = HttpFetcher::from_config(&config).expect("Failed to build fetcher");
    ScheduleRunner::new(Arc::new(fetcher), OutputMaterializer::filesystem(), config)
}

async fn run_single(job: CrawlJob) -> JobOutcome {
    let report = runner().run(RunMode::Single(job)).await;
    assert_eq!(report.jobs.len(), 1);
    report.jobs[0].outcome.clone()
}

fn read_sitemap(path: &Path) -> String {
    let text = std::fs::read_to_string(path).expect("Failed to read sitemap");
    assert!(text.starts_with(BOM), "sitemap should start with a BOM");
    text.trim_start_matches(BOM).to_string()
}

fn locs(xml: &str) -> Vec<String> {
    xml.split("<loc>")
        .skip(1)
        .filter_map(|chunk| chunk.split("</loc>").next())
        .map(str::to_string)
        .collect()
}

fn stored_links(path: &Path) -> Vec<String> {
    let conn = Connection::open(path).expect("Failed to open link store");
    let mut stmt = conn
        .prepare("SELECT link FROM links ORDER BY id")
        .expect("Failed to prepare query");
    stmt.query_map([], |row| row.get(0))
        .expect("Failed to query links")
        .collect::<Result<_, _>>()
        .expect("Failed to read links")
}

#[tokio::test]
async fn test_full_crawl_to_sitemap() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("sitemap.xml");

    mount_robots(&server, "User-agent: *\nAllow: /\n").await;
    mount_page(
        &server,
        "/",
        r##"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="page2">Page 2</a>
            <a href="#top">Top</a>
            <a href="https://external.example/x">Elsewhere</a>
        </body></html>"##,
    )
    .await;
    mount_page(&server, "/page1", r#"<a href="/page2">Again</a><a href="/">Home</a>"#).await;
    mount_page(&server, "/page2", "<p>Leaf</p>").await;

    let outcome = run_single(CrawlJob::new(
        base.clone(),
        OutputKind::Sitemap,
        Some(destination.clone()),
    ))
    .await;
    assert_eq!(
        outcome,
        JobOutcome::Materialized(Materialized::Written { entries: 3 })
    );

    let xml = read_sitemap(&destination);
    assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
    assert_eq!(
        locs(&xml),
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base)
        ]
    );
    assert_eq!(xml.matches("<changefreq>daily</changefreq>").count(), 3);
    assert_eq!(xml.matches("<priority>0.8</priority>").count(), 3);

    let stamps: Vec<&str> = xml
        .split("<lastmod>")
        .skip(1)
        .filter_map(|chunk| chunk.split("</lastmod>").next())
        .collect();
    assert_eq!(stamps.len(), 3);
    assert!(stamps.iter().all(|s| *s == stamps[0]));
    assert!(stamps[0].ends_with("+00:00"));
    assert!(!xml.contains("external.example"));
}

#[tokio::test]
async fn test_user_agent_sent_with_requests() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = run_single(CrawlJob::new(
        server.uri(),
        OutputKind::Sitemap,
        Some(temp_dir.path().join("sitemap.xml")),
    ))
    .await;
    assert!(matches!(outcome, JobOutcome::Materialized(_)));
}

#[tokio::test]
async fn test_disallowed_prefix_never_requested() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("sitemap.xml");

    mount_robots(
        &server,
        "User-agent: OtherBot\nDisallow: /\n\nUser-agent: CrawlerBot\nDisallow: /private\n",
    )
    .await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "").await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    run_single(CrawlJob::new(
        base.clone(),
        OutputKind::Sitemap,
        Some(destination.clone()),
    ))
    .await;

    let xml = read_sitemap(&destination);
    assert_eq!(locs(&xml), vec![format!("{}/", base), format!("{}/public", base)]);
}

#[tokio::test]
async fn test_disallow_root_terminates_crawl() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("sitemap.xml");

    mount_robots(&server, "User-agent: *\nDisallow: /\n").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run_single(CrawlJob::new(
        server.uri(),
        OutputKind::Sitemap,
        Some(destination.clone()),
    ))
    .await;

    assert_eq!(
        outcome,
        JobOutcome::PolicyTerminated(TerminationReason::DisallowAll)
    );
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_noindex_page_excluded_but_links_followed() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("sitemap.xml");

    mount_robots(&server, "").await;
    mount_page(&server, "/", r#"<a href="/hidden">Hidden</a>"#).await;
    mount_page(
        &server,
        "/hidden",
        r#"<head><meta name="robots" content="noindex"></head><a href="/found">Found</a>"#,
    )
    .await;
    mount_page(&server, "/found", "").await;

    run_single(CrawlJob::new(
        base.clone(),
        OutputKind::Sitemap,
        Some(destination.clone()),
    ))
    .await;

    let xml = read_sitemap(&destination);
    assert_eq!(locs(&xml), vec![format!("{}/", base), format!("{}/found", base)]);
}

#[tokio::test]
async fn test_rel_nofollow_links_not_traversed() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("links.db");

    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/login" rel="nofollow">Login</a><a href="/about">About</a>"#,
    )
    .await;
    mount_page(&server, "/about", "").await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    run_single(CrawlJob::new(
        base.clone(),
        OutputKind::LinkStore,
        Some(destination.clone()),
    ))
    .await;

    assert_eq!(
        stored_links(&destination),
        vec![format!("{}/", base), format!("{}/about", base)]
    );
}

#[tokio::test]
async fn test_link_store_output() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("links.db");
    std::fs::write(&destination, "stale contents").unwrap();

    mount_robots(&server, "").await;
    mount_page(&server, "/", r#"<a href="/b">B</a><a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "").await;
    mount_page(&server, "/b", "").await;

    let outcome = run_single(CrawlJob::new(
        base.clone(),
        OutputKind::LinkStore,
        Some(destination.clone()),
    ))
    .await;
    assert_eq!(
        outcome,
        JobOutcome::Materialized(Materialized::Written { entries: 3 })
    );

    assert_eq!(
        stored_links(&destination),
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base)
        ]
    );
    assert!(!temp_dir.path().join("links.db.partial").exists());
}

#[tokio::test]
async fn test_keyworded_sitemap() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("kw-sitemap.xml");

    mount_robots(&server, "").await;
    mount_page(
        &server,
        "/",
        r#"<head>
            <title>Home</title>
            <meta name="description" content="The home page">
            <meta name="keywords" content="home, start">
        </head>
        <a href="/plain">Plain</a>"#,
    )
    .await;
    mount_page(&server, "/plain", "<head><title>Plain</title></head>").await;

    let outcome = run_single(CrawlJob::new(
        server.uri(),
        OutputKind::KeywordedSitemap,
        Some(destination.clone()),
    ))
    .await;
    assert_eq!(
        outcome,
        JobOutcome::Materialized(Materialized::Written { entries: 2 })
    );

    let xml = read_sitemap(&destination);
    assert!(xml.contains(r#"<urlset xmlns="urn:crawlerbot:kw-sitemap:1.0">"#));
    assert!(xml.contains("<title>Home</title>"));
    assert!(xml.contains("<description>The home page</description>"));
    assert!(xml.contains("<keywords>home, start</keywords>"));
    assert!(xml.contains("<title>Plain</title>"));
    assert!(xml.contains("<description></description>"));
    assert!(xml.contains("<keywords></keywords>"));
}

#[tokio::test]
async fn test_batch_from_job_file_continues_after_failure() {
    let broken = MockServer::start().await;
    let healthy = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;
    mount_robots(&healthy, "").await;
    mount_page(&healthy, "/", "<p>ok</p>").await;

    let broken_out = temp_dir.path().join("broken.xml");
    let healthy_out = temp_dir.path().join("healthy.db");
    let xml = format!(
        r#"<jobs>
            <job site="{}"><type>sitemap</type><out>{}</out></job>
            <job site="{}"><type>db</type><out>{}</out></job>
        </jobs>"#,
        broken.uri(),
        broken_out.display(),
        healthy.uri(),
        healthy_out.display()
    );
    let jobs = parse_jobs(&xml).expect("Failed to parse jobs");

    let report = runner().run(RunMode::Batch(jobs)).await;

    assert_eq!(report.jobs.len(), 2);
    assert!(matches!(report.jobs[0].outcome, JobOutcome::Failed(_)));
    assert_eq!(
        report.jobs[1].outcome,
        JobOutcome::Materialized(Materialized::Written { entries: 1 })
    );
    assert_eq!(report.failures(), 1);
    assert!(!broken_out.exists());
    assert_eq!(stored_links(&healthy_out), vec![format!("{}/", healthy.uri())]);
}

#[tokio::test]
async fn test_sitemap_seeds_orphan_pages() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("sitemap.xml");

    mount_robots(&server, &format!("Sitemap: {}/sitemap.xml\n", base)).await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>{}/orphan</loc></url>
            </urlset>"#,
            base
        )))
        .mount(&server)
        .await;
    mount_page(&server, "/", "<p>No links</p>").await;
    mount_page(&server, "/orphan", "").await;

    run_single(CrawlJob::new(
        base.clone(),
        OutputKind::Sitemap,
        Some(destination.clone()),
    ))
    .await;

    let xml = read_sitemap(&destination);
    assert_eq!(locs(&xml), vec![format!("{}/", base), format!("{}/orphan", base)]);
}
