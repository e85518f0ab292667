//! HTML link extraction
//!
//! Parses a fetched page and extracts same-site links with their anchor
//! text. Cross-site links, fragment-only anchors, and non-navigational
//! schemes are dropped here, before the coordinator ever sees them.

use scraper::{Html, Selector};
use url::Url;

/// A link discovered on a page: the resolved absolute URL and the anchor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: String,
    pub anchor_text: String,
}

/// Extracts same-site links from HTML content.
///
/// Only `<a href>` elements whose resolved target shares `base_url`'s host
/// survive. Links are returned with their original (unnormalized) URL; the
/// coordinator normalizes separately for dedup and keeps the original for
/// the request itself.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_same_site(href, base_url) {
            let anchor_text = element.text().collect::<String>().trim().to_string();
            links.push(ExtractedLink { url, anchor_text });
        }
    }

    links
}

/// Resolves an href against the base URL, keeping it only if it stays on
/// the same host over http(s).
fn resolve_same_site(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Fragment-only links point back at the same page
    if href.starts_with('#') {
        return None;
    }

    let absolute = base_url.join(href).ok()?;

    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    if absolute.host_str() != base_url.host_str() {
        return None;
    }

    Some(absolute.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn urls(links: &[ExtractedLink]) -> Vec<&str> {
        links.iter().map(|l| l.url.as_str()).collect()
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(urls(&links), vec!["https://example.com/other"]);
        assert_eq!(links[0].anchor_text, "Link");
    }

    #[test]
    fn test_extract_anchor_text() {
        let html = r#"<html><body><a href="/a"><b>Read</b> More</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links[0].anchor_text, "Read More");
    }

    #[test]
    fn test_cross_site_link_excluded() {
        let html = r#"<html><body><a href="https://other.com/x">Elsewhere</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert!(links.is_empty());
    }

    #[test]
    fn test_same_site_absolute_link_kept() {
        let html = r#"<html><body><a href="https://example.com/deep">Deep</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(urls(&links), vec!["https://example.com/deep"]);
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <html><body>
                <a href="javascript:void(0)">JS</a>
                <a href="mailto:x@example.com">Mail</a>
                <a href="tel:+123">Call</a>
                <a href="data:text/html,x">Data</a>
            </body></html>
        "#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_mixed_links() {
        let html = r#"
            <html><body>
                <a href="/a">A</a>
                <a href="/a">A again</a>
                <a href="https://other.com/x">Cross-site</a>
                <a href="/b">B</a>
            </body></html>
        "#;
        let links = extract_links(html, &base_url());
        // Duplicates survive extraction; dedup happens in the coordinator
        assert_eq!(
            urls(&links),
            vec![
                "https://example.com/a",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let html = r#"<body><a href="/ok">Ok</a><div><span></body>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(urls(&links), vec!["https://example.com/ok"]);
    }
}
