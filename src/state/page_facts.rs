use std::collections::BTreeSet;
use url::Url;

/// Metadata extracted from one fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    /// Internal links found on the page, deduplicated
    pub links: BTreeSet<Url>,

    /// Subset of `links` carried on `rel="nofollow"` anchors
    pub nofollow_links: BTreeSet<Url>,

    /// Text of the first `<title>` element
    pub title: Option<String>,

    /// `<meta name="description">`, last one wins
    pub description: Option<String>,

    /// `<meta name="keywords">`, last one wins
    pub keywords: Option<String>,

    /// `<meta http-equiv="content-location">` resolved against the origin
    pub canonical_location: Option<Url>,

    /// `<meta name="robots" content="noindex">` was present
    pub no_index: bool,

    /// `<meta name="robots" content="nofollow">` was present
    pub nofollow: bool,
}

impl PageFacts {
    /// Links the crawl may traverse from this page
    ///
    /// Empty when the page carries a meta nofollow; otherwise every recorded
    /// link except those marked `rel="nofollow"`.
    pub fn followable_links(&self) -> impl Iterator<Item = &Url> {
        let page_nofollow = self.nofollow;
        self.links
            .iter()
            .filter(move |link| !page_nofollow && !self.nofollow_links.contains(*link))
    }
}
