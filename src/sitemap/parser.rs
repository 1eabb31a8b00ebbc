//! Parse sitemap.xml and sitemap index documents.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while parsing a sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Sitemap has no root element")]
    Empty,
}

/// Locations listed by one sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// `<sitemap><loc>` entries pointing at further `.xml` sitemaps
    pub child_sitemaps: Vec<String>,

    /// Every other `<loc>` entry
    pub leaf_urls: Vec<String>,
}

/// Parses a sitemap or sitemap index document
///
/// Child sitemaps are listed, never fetched.
///
/// # Example
///
/// ```
/// use crawlerbot::sitemap::parse;
///
/// let doc = parse(r#"<urlset><url><loc>https://site.example/a</loc></url></urlset>"#).unwrap();
/// assert_eq!(doc.leaf_urls, vec!["https://site.example/a".to_string()]);
/// ```
pub fn parse(document: &str) -> Result<SitemapDocument, SitemapError> {
    let mut reader = Reader::from_str(document.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut parsed = SitemapDocument::default();
    let mut buf = Vec::new();

    let mut saw_root = false;
    let mut in_sitemap = false;
    let mut in_loc = false;
    let mut current_loc = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                saw_root = true;
                match e.local_name().as_ref() {
                    b"sitemap" => in_sitemap = true,
                    b"loc" => {
                        in_loc = true;
                        current_loc.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Text(e)) if in_loc => {
                let text = e.unescape().map_err(|err| SitemapError::Xml {
                    position: reader.buffer_position() as u64,
                    message: err.to_string(),
                })?;
                current_loc.push_str(&text);
            }
            Ok(Event::CData(e)) if in_loc => {
                current_loc.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" if in_loc => {
                    in_loc = false;
                    let loc = current_loc.trim().to_string();
                    if loc.is_empty() {
                        tracing::debug!("Skipping empty <loc>");
                    } else if in_sitemap && loc.ends_with(".xml") {
                        parsed.child_sitemaps.push(loc);
                    } else {
                        parsed.leaf_urls.push(loc);
                    }
                }
                b"sitemap" => in_sitemap = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SitemapError::Xml {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SitemapError::Empty);
    }

    Ok(parsed)
}
