//! Listing extraction from marketplace search pages.
//!
//! Two backends produce the same `Listing`s from the same markup:
//! - [`PatternExtractor`]: regex scan over product anchors. Each field is found
//!   by its own narrow heuristic, so drift in one part of the markup costs one
//!   field rather than the whole listing.
//! - [`SelectorExtractor`]: CSS selectors over result rows.
//!
//! One is chosen at startup from [`ExtractorBackend`]. Both share the
//! normalization helpers and the [`ListingCollector`] below, which enforces
//! de-duplication by `source_url` and the result cap.

pub mod pattern;
pub mod selector;

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use crate::config::ExtractorBackend;

use super::models::Listing;

pub use pattern::PatternExtractor;
pub use selector::SelectorExtractor;

/// Most listings one search returns.
pub const MAX_LISTINGS: usize = 48;

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Finds listings in raw search-page markup.
///
/// Implementations are pure: no I/O, and malformed markup yields fewer (or
/// zero) listings, never an error.
pub trait ListingExtractor: Send + Sync {
    fn extract(&self, markup: &str, site_base_url: &str) -> Vec<Listing>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Extractor for the configured backend.
pub fn extractor_for(backend: ExtractorBackend, path_prefix: &str) -> Arc<dyn ListingExtractor> {
    match backend {
        ExtractorBackend::Pattern => Arc::new(PatternExtractor::new(path_prefix)),
        ExtractorBackend::Selector => Arc::new(SelectorExtractor::new(path_prefix)),
    }
}

/// Accumulates listings in first-found order, dropping repeated source URLs
/// and anything past the cap.
#[derive(Debug)]
pub struct ListingCollector {
    seen: HashSet<String>,
    listings: Vec<Listing>,
    cap: usize,
}

impl Default for ListingCollector {
    fn default() -> Self {
        Self::with_cap(MAX_LISTINGS)
    }
}

impl ListingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            seen: HashSet::new(),
            listings: Vec::new(),
            cap,
        }
    }

    /// Returns false when the listing was a duplicate or the cap is reached.
    pub fn push(&mut self, listing: Listing) -> bool {
        if self.is_full() || !self.seen.insert(listing.source_url.clone()) {
            return false;
        }
        self.listings.push(listing);
        true
    }

    pub fn has_seen(&self, source_url: &str) -> bool {
        self.seen.contains(source_url)
    }

    pub fn is_full(&self) -> bool {
        self.listings.len() >= self.cap
    }

    pub fn into_listings(self) -> Vec<Listing> {
        self.listings
    }
}

/// Absolute product URL for a link target, without query string or fragment.
///
/// Absolute targets are kept, protocol-relative ones get `https:`, anything
/// else is resolved against the site base URL.
pub fn resolve_source_url(href: &str, site_base_url: &str) -> String {
    let href = decode_entities(href.trim());
    let href = href
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        match Url::parse(site_base_url).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}/{}",
                site_base_url.trim_end_matches('/'),
                href.trim_start_matches('/')
            ),
        }
    }
}

/// Visible text of a markup fragment: tags removed, entities decoded,
/// whitespace collapsed and trimmed. Empty text is `None`.
pub fn clean_text(fragment: &str) -> Option<String> {
    let without_tags = TAG_REGEX.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    let collapsed = WHITESPACE_REGEX.replace_all(decoded.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Prefer the lazy-load attribute: `src` is often a placeholder until the
/// page script swaps the real image in.
pub fn pick_image_url(data_src: Option<&str>, src: Option<&str>) -> Option<String> {
    [data_src, src]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(decode_entities)
}

/// Decode the handful of entities that show up in link text and attributes.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.cardmarket.com";

    fn listing(url: &str) -> Listing {
        Listing::from_text(url.to_string(), None, None)
    }

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            resolve_source_url("/en/OnePiece/Products/123?language=1", BASE),
            "https://www.cardmarket.com/en/OnePiece/Products/123"
        );
        assert_eq!(
            resolve_source_url("en/OnePiece/Products/123", "https://www.cardmarket.com/"),
            "https://www.cardmarket.com/en/OnePiece/Products/123"
        );
    }

    #[test]
    fn test_resolve_absolute_and_protocol_relative_href() {
        assert_eq!(
            resolve_source_url("https://www.cardmarket.com/en/OnePiece/Products/9#offers", BASE),
            "https://www.cardmarket.com/en/OnePiece/Products/9"
        );
        assert_eq!(
            resolve_source_url("//www.cardmarket.com/en/OnePiece/Products/9", BASE),
            "https://www.cardmarket.com/en/OnePiece/Products/9"
        );
    }

    #[test]
    fn test_resolve_decodes_entities_before_stripping_query() {
        assert_eq!(
            resolve_source_url("/en/OnePiece/Products/1?a=1&amp;b=2", BASE),
            "https://www.cardmarket.com/en/OnePiece/Products/1"
        );
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  <span>OP05-119</span>\n  <b>English</b> "),
            Some("OP05-119 English".to_string())
        );
        assert_eq!(clean_text("Luffy &amp; Zoro"), Some("Luffy & Zoro".to_string()));
        assert_eq!(clean_text("<img src=\"x\">  \n"), None);
        assert_eq!(clean_text(""), None);
    }

    #[test]
    fn test_pick_image_url_prefers_lazy_attribute() {
        assert_eq!(
            pick_image_url(Some("http://img/real.png"), Some("placeholder.gif")),
            Some("http://img/real.png".to_string())
        );
        assert_eq!(
            pick_image_url(Some("  "), Some("http://img/x.png")),
            Some("http://img/x.png".to_string())
        );
        assert_eq!(pick_image_url(None, None), None);
    }

    #[test]
    fn test_collector_dedupes_and_caps() {
        let mut collector = ListingCollector::with_cap(2);
        assert!(collector.push(listing("https://a/1")));
        assert!(!collector.push(listing("https://a/1")));
        assert!(collector.push(listing("https://a/2")));
        assert!(collector.is_full());
        assert!(!collector.push(listing("https://a/3")));

        let urls: Vec<String> = collector
            .into_listings()
            .into_iter()
            .map(|l| l.source_url)
            .collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2"]);
    }

    #[test]
    fn test_default_collector_cap() {
        let mut collector = ListingCollector::new();
        for i in 0..60 {
            collector.push(listing(&format!("https://a/{}", i)));
        }
        assert_eq!(collector.into_listings().len(), MAX_LISTINGS);
    }
}
