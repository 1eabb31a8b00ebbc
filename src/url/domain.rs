use crate::{UrlError, UrlResult};
use url::{Position, Url};

/// Derives the origin a crawl is scoped to from a seed URL
///
/// The origin keeps scheme, host and port and resets the path to `/`.
///
/// # Examples
///
/// ```
/// use crawlerbot::url::site_origin;
///
/// let origin = site_origin("https://Site.Example/blog/post?x=1#top").unwrap();
/// assert_eq!(origin.as_str(), "https://site.example/");
/// ```
pub fn site_origin(site: &str) -> UrlResult<Url> {
    let url = Url::parse(site.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Url::parse(&url[..Position::BeforePath])
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Returns true if both URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
