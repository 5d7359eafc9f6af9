//! URL shaping for Wikimedia resources.
//!
//! Both builders reproduce the shapes the harvested data already uses, so
//! enriched records and upstream rows stay string-comparable: Commons file
//! names are percent-encoded, Wikipedia article titles are emitted verbatim
//! apart from the underscore substitution.

use url::Url;

const COMMONS_WIKI_BASE: &str = "https://commons.wikimedia.org/wiki/";
const WIKIPEDIA_ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";

/// Commons file page URL for a `P18` image claim value.
///
/// Strips a leading `File:`, replaces spaces with underscores, and
/// percent-encodes the name into the final path segment. Empty names yield
/// `None` rather than a bare base URL.
pub fn commons_file_url(file_name: &str) -> Option<String> {
    let name = file_name.trim();
    let name = name.strip_prefix("File:").unwrap_or(name).trim();
    if name.is_empty() {
        return None;
    }
    let segment = format!("File:{}", name.replace(' ', "_"));
    let mut url = Url::parse(COMMONS_WIKI_BASE).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(&segment);
    Some(url.to_string())
}

/// English Wikipedia article URL for a sitelink title.
///
/// Titles keep their raw characters (only spaces become underscores); the
/// upstream data emits article URLs the same way.
pub fn wikipedia_article_url(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(format!(
        "{WIKIPEDIA_ARTICLE_BASE}{}",
        title.replace(' ', "_")
    ))
}
