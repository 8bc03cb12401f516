//! HTML parser for extracting images and links
//!
//! This module handles parsing HTML content to extract:
//! - Image sources (from `<img src>`)
//! - Links to follow (from `<a href>`)
//! - Pagination links (anchors whose raw href carries `page=<digits>`)
//!
//! Parsing is tolerant: malformed markup yields fewer results, never an error.

use crate::url::is_http_family;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Absolute HTTP(S) image URLs, in document order, not deduplicated
    pub images: Vec<String>,

    /// Absolute HTTP(S) anchor targets, in document order
    pub links: Vec<Url>,

    /// Absolute anchor targets whose raw href matched the pagination pattern
    pub pagination_links: Vec<Url>,
}

fn img_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img[src]").expect("static 'img[src]' selector is valid"))
}

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("static 'a[href]' selector is valid"))
}

fn pagination_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[?&]page=\d+").expect("static pagination regex is valid"))
}

/// Returns true if a raw href looks like a pagination link
pub fn is_pagination_href(href: &str) -> bool {
    pagination_regex().is_match(href)
}

/// Parses HTML content and extracts images and links
///
/// # Extraction Rules
///
/// - Every `<img>` with a non-empty `src` is resolved against `page_url`;
///   results that are not HTTP(S) (e.g. `data:` URIs) are dropped
/// - Every `<a>` with an `href` is resolved against `page_url`; results that
///   are not HTTP(S) are dropped from `links`
/// - When `auto_pagination` is set, anchors whose raw href matches
///   `[?&]page=\d+` are also collected into `pagination_links`
///
/// # Example
///
/// ```
/// use sumi_sieve::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><img src="/a.png"><a href="/next">Next</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url, false);
/// assert_eq!(parsed.images, vec!["https://example.com/a.png".to_string()]);
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_html(html: &str, page_url: &Url, auto_pagination: bool) -> ParsedPage {
    let document = Html::parse_document(html);

    let images = extract_images(&document, page_url);

    let mut links = Vec::new();
    let mut pagination_links = Vec::new();

    for element in document.select(anchor_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = page_url.join(href.trim()) else {
            continue;
        };

        if auto_pagination && is_pagination_href(href) {
            pagination_links.push(resolved.clone());
        }

        if is_http_family(&resolved) {
            links.push(resolved);
        }
    }

    ParsedPage {
        images,
        links,
        pagination_links,
    }
}

/// Extracts all HTTP(S) image sources from the document
fn extract_images(document: &Html, page_url: &Url) -> Vec<String> {
    document
        .select(img_selector())
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .filter_map(|src| page_url.join(src).ok())
        .filter(is_http_family)
        .map(String::from)
        .collect()
}
