//! URL handling for webrill
//!
//! Provides the canonical URL normalizer used as the dedup key for the
//! coordinator's visited table, plus small helpers shared by the classifier
//! and the link extractor.

mod normalize;

pub use normalize::normalize;

use url::Url;

/// Extracts the path component of a link target for rule matching.
///
/// Absolute links (anything starting with `http`) are parsed and reduced to
/// their path; relative links are matched as-is. Returns `None` when an
/// absolute link fails to parse, which callers treat as "do not follow".
pub fn match_target(link: &str) -> Option<String> {
    if link.starts_with("http") {
        Url::parse(link).ok().map(|u| u.path().to_string())
    } else {
        Some(link.to_string())
    }
}

/// Derives the robots.txt location for a site from any URL on it.
pub fn robots_location(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Some(format!("{}://{}/robots.txt", parsed.scheme(), authority))
}
