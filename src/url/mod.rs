//! URL handling module for CrawlerBot
//!
//! This module derives a crawl's origin from its seed, classifies anchor
//! hrefs as internal or external, and resolves internal references.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{same_origin, site_origin};
pub use normalize::resolve_reference;

/// How an anchor href relates to the site under crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HrefClass {
    /// Empty or unusable href
    Malformed,
    /// Pure fragment reference (`#...`)
    Fragment,
    /// Absolute URL with a scheme, or a reference that leaves the origin
    External,
    /// Relative reference resolved onto the origin
    Internal(Url),
}

impl HrefClass {
    /// Returns the resolved URL for internal links
    pub fn internal(self) -> Option<Url> {
        match self {
            Self::Internal(url) => Some(url),
            _ => None,
        }
    }
}

/// Classifies an anchor href against the crawl origin
///
/// Any href carrying a scheme is external, whatever host it names; only
/// relative references become crawlable links. A network-path reference
/// (`//host/...`) is internal only when it names the origin's own host.
///
/// # Examples
///
/// ```
/// use crawlerbot::url::{classify_href, HrefClass};
/// use url::Url;
///
/// let origin = Url::parse("https://site.example/").unwrap();
/// assert_eq!(classify_href("#section", &origin), HrefClass::Fragment);
/// assert_eq!(classify_href("https://external.example/x", &origin), HrefClass::External);
/// assert_eq!(
///     classify_href("/about", &origin),
///     HrefClass::Internal(Url::parse("https://site.example/about").unwrap())
/// );
/// ```
pub fn classify_href(href: &str, origin: &Url) -> HrefClass {
    let href = href.trim();

    if href.is_empty() {
        return HrefClass::Malformed;
    }

    if href.starts_with('#') {
        return HrefClass::Fragment;
    }

    if Url::parse(href).is_ok() {
        return HrefClass::External;
    }

    match resolve_reference(href, origin) {
        Ok(url) => HrefClass::Internal(url),
        // Relative references only fail by leaving the origin
        Err(_) => HrefClass::External,
    }
}
