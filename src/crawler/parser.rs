//! HTML parser for extracting links and metadata
//!
//! This module handles parsing one fetched page into [`PageFacts`]:
//! - Internal links to follow (from `<a href>`), honouring `rel="nofollow"`
//! - Meta robots directives (`noindex`, `nofollow`)
//! - Description, keywords and content-location meta values
//! - Page title

use crate::state::PageFacts;
use crate::url::{classify_href, resolve_reference, HrefClass};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses page markup and extracts its facts
///
/// html5ever lower-cases tag and attribute names, so lookups here are
/// case-insensitive on names; meta `name`/`http-equiv` values and `rel`
/// tokens are compared case-insensitively too. Malformed values are skipped.
///
/// # Arguments
///
/// * `markup` - The page body
/// * `page_url` - The URL the page was fetched from
/// * `site_origin` - Origin relative hrefs are resolved against
///
/// # Example
///
/// ```
/// use crawlerbot::crawler::extract;
/// use url::Url;
///
/// let origin = Url::parse("https://site.example/").unwrap();
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let facts = extract(html, &origin, &origin);
/// assert_eq!(facts.title.as_deref(), Some("Test"));
/// assert_eq!(facts.links.len(), 1);
/// ```
pub fn extract(markup: &str, page_url: &Url, site_origin: &Url) -> PageFacts {
    let document = Html::parse_document(markup);
    let mut facts = PageFacts::default();

    extract_meta(&document, site_origin, &mut facts);
    facts.title = extract_title(&document);
    extract_links(&document, page_url, site_origin, &mut facts);

    facts
}

/// Applies every `<meta>` element to the facts in document order
fn extract_meta(document: &Html, site_origin: &Url, facts: &mut PageFacts) {
    let Ok(meta_selector) = Selector::parse("meta") else {
        return;
    };

    for element in document.select(&meta_selector) {
        let content = element.value().attr("content");

        if let Some(name) = element.value().attr("name") {
            let Some(content) = content else {
                tracing::debug!("Skipping meta {:?} without content", name);
                continue;
            };

            match name.trim().to_ascii_lowercase().as_str() {
                "robots" => {
                    let directives = content.to_ascii_lowercase();
                    if directives.contains("nofollow") {
                        facts.nofollow = true;
                    }
                    if directives.contains("noindex") {
                        facts.no_index = true;
                    }
                }
                "description" => facts.description = Some(content.trim().to_string()),
                "keywords" => facts.keywords = Some(content.trim().to_string()),
                _ => {}
            }
        } else if let Some(http_equiv) = element.value().attr("http-equiv") {
            if !http_equiv.trim().eq_ignore_ascii_case("content-location") {
                continue;
            }
            let Some(content) = content else {
                continue;
            };
            match resolve_reference(content, site_origin) {
                Ok(location) => facts.canonical_location = Some(location),
                Err(e) => tracing::debug!("Ignoring content-location {:?}: {}", content, e),
            }
        }
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Records every internal anchor target
fn extract_links(document: &Html, page_url: &Url, site_origin: &Url, facts: &mut PageFacts) {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match classify_href(href, site_origin) {
            HrefClass::Internal(link) => {
                tracing::debug!("{} links to {}", page_url, link);
                if has_nofollow_rel(&element) {
                    tracing::info!("Not following {} (rel=nofollow)", link);
                    facts.nofollow_links.insert(link.clone());
                }
                facts.links.insert(link);
            }
            HrefClass::External => tracing::debug!("Skipping external link {}", href.trim()),
            HrefClass::Fragment | HrefClass::Malformed => {}
        }
    }
}

fn has_nofollow_rel(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("nofollow"))
        })
        .unwrap_or(false)
}
