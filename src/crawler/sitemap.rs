//! Sitemap parser for extracting release identifiers
//!
//! A sitemap is a `<urlset>` of `<url><loc>…</loc></url>` entries. Only
//! locations of the form `https://www.anilibria.tv/release/<code>.html`
//! name a release; every other location is ignored.
//!
//! The document must be well-formed XML. A truncated download is rejected
//! rather than yielding the releases listed before the cut.

use crate::DumpError;
use regex::Regex;
use roxmltree::{Document, Node};
use std::sync::LazyLock;

static RELEASE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.anilibria\.tv/release/(.+)\.html$").expect("valid regex")
});

/// Extracts release identifiers from sitemap content
///
/// Identifiers come out in document order. Duplicates are kept.
///
/// # Arguments
///
/// * `content` - The sitemap document
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Identifiers, possibly empty
/// * `Err(DumpError::Sitemap)` - The document is not well-formed XML or its
///   root element is not `<urlset>`
///
/// # Example
///
/// ```
/// use anidump::crawler::parse_sitemap;
///
/// let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
/// <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://www.anilibria.tv/release/naruto.html</loc></url>
///   <url><loc>https://www.anilibria.tv/pages/schedule.php</loc></url>
/// </urlset>"#;
/// assert_eq!(parse_sitemap(xml).unwrap(), vec!["naruto"]);
/// ```
pub fn parse_sitemap(content: &str) -> Result<Vec<String>, DumpError> {
    let document = Document::parse(content).map_err(|e| DumpError::Sitemap(e.to_string()))?;

    let urlset = document.root_element();
    if urlset.tag_name().name() != "urlset" {
        return Err(DumpError::Sitemap(format!(
            "root element is <{}>, expected <urlset>",
            urlset.tag_name().name()
        )));
    }

    let identifiers: Vec<String> = child_elements(urlset, "url")
        .flat_map(|url| child_elements(url, "loc"))
        .filter_map(|loc| {
            let text: String = loc
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            release_identifier(text.trim()).map(str::to_string)
        })
        .collect();

    tracing::debug!("Sitemap lists {} releases", identifiers.len());
    Ok(identifiers)
}

fn child_elements<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent
        .children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Returns the release code of a release page URL
pub fn release_identifier(loc: &str) -> Option<&str> {
    RELEASE_URL_REGEX
        .captures(loc)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}
