use crate::url::domain::same_origin;
use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves an internal reference against the site origin
///
/// # Resolution Steps
///
/// 1. Collapse repeated `/` in the path part of the reference, unless it is
///    a network-path reference (`//host/...`), which names its own host
/// 2. Join the reference onto the origin
/// 3. Drop the fragment
/// 4. Strip a trailing `/index.<ext>` down to its directory
///
/// The result must stay on the origin; anything else is an error.
///
/// # Examples
///
/// ```
/// use crawlerbot::url::resolve_reference;
/// use url::Url;
///
/// let origin = Url::parse("https://site.example/").unwrap();
/// let url = resolve_reference("/docs//index.html", &origin).unwrap();
/// assert_eq!(url.as_str(), "https://site.example/docs/");
///
/// assert!(resolve_reference("//other.example/x", &origin).is_err());
/// ```
pub fn resolve_reference(reference: &str, origin: &Url) -> UrlResult<Url> {
    let reference = reference.trim();

    let joined = if reference.starts_with("//") {
        origin.join(reference)
    } else {
        Url::parse(reference).or_else(|_| origin.join(&collapse_slashes(reference)))
    };
    let mut url = joined.map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    if !same_origin(&url, origin) {
        return Err(UrlError::Parse(format!(
            "{} resolves outside {}",
            reference, origin
        )));
    }

    url.set_fragment(None);

    if let Some(stripped) = strip_index_suffix(url.path()) {
        url.set_path(&stripped);
    }

    Ok(url)
}

/// Collapses runs of `/` in the path portion, leaving query and fragment alone
fn collapse_slashes(reference: &str) -> String {
    let split_at = reference.find(['?', '#']).unwrap_or(reference.len());
    let (path, rest) = reference.split_at(split_at);

    let mut collapsed = String::with_capacity(reference.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }

    collapsed.push_str(rest);
    collapsed
}

/// Returns the directory path when the last segment is `index.<ext>`
fn strip_index_suffix(path: &str) -> Option<String> {
    let (dir, last) = path.rsplit_once('/')?;
    let ext = last.strip_prefix("index.")?;

    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(format!("{}/", dir))
}
