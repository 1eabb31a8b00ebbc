//! Sitemap entry builder and renderer
//!
//! Plain and keyworded sitemaps share one builder. Each entry's metadata is
//! read from its own URL's facts.

use crate::config::OutputKind;
use crate::output::traits::{OutputError, OutputResult};
use crate::state::CrawlState;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Root namespace of a plain sitemap
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Root namespace of a keyworded sitemap
pub const KW_SITEMAP_NAMESPACE: &str = "urn:crawlerbot:kw-sitemap:1.0";

pub const CHANGE_FREQUENCY: &str = "daily";
pub const PRIORITY: &str = "0.8";

const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Page metadata carried by keyworded sitemap entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub title: String,
    pub description: String,
    /// Present on every entry when any page in the run had keywords
    pub keywords: Option<String>,
}

/// One `<url>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub metadata: Option<EntryMetadata>,
}

/// Formats the `lastmod` stamp shared by every entry of one document
pub fn lastmod_stamp(now: DateTime<Utc>) -> String {
    now.format(LASTMOD_FORMAT).to_string()
}

/// Root namespace for a sitemap kind
pub fn namespace_for(kind: OutputKind) -> &'static str {
    match kind {
        OutputKind::KeywordedSitemap => KW_SITEMAP_NAMESPACE,
        OutputKind::Sitemap | OutputKind::LinkStore => SITEMAP_NAMESPACE,
    }
}

/// Builds one entry per eligible URL, in sorted order
pub fn build_entries(state: &CrawlState, kind: OutputKind, lastmod: &str) -> Vec<SitemapEntry> {
    let with_keywords = state.any_keywords();

    state
        .eligible_urls()
        .into_iter()
        .map(|url| {
            let metadata = (kind == OutputKind::KeywordedSitemap).then(|| {
                let facts = state.facts(url);
                EntryMetadata {
                    title: facts.and_then(|f| f.title.clone()).unwrap_or_default(),
                    description: facts
                        .and_then(|f| f.description.clone())
                        .unwrap_or_default(),
                    keywords: with_keywords
                        .then(|| facts.and_then(|f| f.keywords.clone()).unwrap_or_default()),
                }
            });

            SitemapEntry {
                loc: url.to_string(),
                lastmod: lastmod.to_string(),
                metadata,
            }
        })
        .collect()
}

/// Renders entries as a `<urlset>` document without a namespace
pub fn render(entries: &[SitemapEntry]) -> OutputResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("urlset")))?;

    for entry in entries {
        write(&mut writer, Event::Start(BytesStart::new("url")))?;
        text_element(&mut writer, "loc", &entry.loc)?;
        text_element(&mut writer, "lastmod", &entry.lastmod)?;
        text_element(&mut writer, "changefreq", CHANGE_FREQUENCY)?;
        text_element(&mut writer, "priority", PRIORITY)?;

        if let Some(metadata) = &entry.metadata {
            text_element(&mut writer, "title", &metadata.title)?;
            text_element(&mut writer, "description", &metadata.description)?;
            if let Some(keywords) = &metadata.keywords {
                text_element(&mut writer, "keywords", keywords)?;
            }
        }

        write(&mut writer, Event::End(BytesEnd::new("url")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("urlset")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| OutputError::Format(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> OutputResult<()> {
    writer
        .write_event(event)
        .map_err(|e| OutputError::Format(e.to_string()))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> OutputResult<()> {
    // Text is written even when empty so the close tag stays on the same line
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PageFacts;
    use chrono::TimeZone;
    use url::Url;

    fn url(path: &str) -> Url {
        Url::parse("https://site.example/").unwrap().join(path).unwrap()
    }

    fn state() -> CrawlState {
        CrawlState::new(url("/"), vec![])
    }

    #[test]
    fn test_lastmod_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(lastmod_stamp(now), "2024-03-05T07:08:09+00:00");
    }

    #[test]
    fn test_duplicate_visits_yield_one_entry_each() {
        let mut state = state();
        state.record_page(url("/a"), PageFacts::default());
        state.record_page(url("/b"), PageFacts::default());
        state.record_page(url("/a"), PageFacts::default());

        let entries = build_entries(&state, OutputKind::Sitemap, "2024-01-01T00:00:00+00:00");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, "https://site.example/a");
        assert_eq!(entries[1].loc, "https://site.example/b");
        assert_eq!(entries[0].lastmod, entries[1].lastmod);
        assert!(entries.iter().all(|e| e.metadata.is_none()));
    }

    #[test]
    fn test_keyworded_fields_align_with_their_url() {
        let mut state = state();
        state.record_page(
            url("/a"),
            PageFacts {
                title: Some("Page A".to_string()),
                keywords: Some("alpha".to_string()),
                ..PageFacts::default()
            },
        );
        state.record_page(
            url("/b"),
            PageFacts {
                description: Some("About B".to_string()),
                ..PageFacts::default()
            },
        );

        let entries = build_entries(&state, OutputKind::KeywordedSitemap, "t");
        let a = entries[0].metadata.as_ref().unwrap();
        let b = entries[1].metadata.as_ref().unwrap();

        assert_eq!(a.title, "Page A");
        assert_eq!(a.description, "");
        assert_eq!(a.keywords.as_deref(), Some("alpha"));
        assert_eq!(b.title, "");
        assert_eq!(b.description, "About B");
        assert_eq!(b.keywords.as_deref(), Some(""));
    }

    #[test]
    fn test_keywords_omitted_when_no_page_has_them() {
        let mut state = state();
        state.record_page(url("/"), PageFacts::default());

        let entries = build_entries(&state, OutputKind::KeywordedSitemap, "t");
        assert_eq!(entries[0].metadata.as_ref().unwrap().keywords, None);
    }

    #[test]
    fn test_render_plain_entry() {
        let entries = vec![SitemapEntry {
            loc: "https://site.example/?a=1&b=2".to_string(),
            lastmod: "2024-01-01T00:00:00+00:00".to_string(),
            metadata: None,
        }];

        let xml = render(&entries).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<loc>https://site.example/?a=1&amp;b=2</loc>"));
        assert!(xml.contains("<lastmod>2024-01-01T00:00:00+00:00</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(!xml.contains("<title>"));
    }

    #[test]
    fn test_render_keyworded_entry() {
        let entries = vec![SitemapEntry {
            loc: "https://site.example/".to_string(),
            lastmod: "t".to_string(),
            metadata: Some(EntryMetadata {
                title: "Home".to_string(),
                description: String::new(),
                keywords: Some("a, b".to_string()),
            }),
        }];

        let xml = render(&entries).unwrap();
        assert!(xml.contains("<title>Home</title>"));
        assert!(xml.contains("<description></description>"));
        assert!(xml.contains("<keywords>a, b</keywords>"));
    }

    #[test]
    fn test_namespace_per_kind() {
        assert_eq!(namespace_for(OutputKind::Sitemap), SITEMAP_NAMESPACE);
        assert_eq!(namespace_for(OutputKind::KeywordedSitemap), KW_SITEMAP_NAMESPACE);
    }
}
