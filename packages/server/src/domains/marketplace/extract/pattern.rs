//! Regex extractor: scans product anchors, their inner markup and the markup
//! right after them.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::{clean_text, pick_image_url, resolve_source_url, ListingCollector, ListingExtractor};
use crate::domains::marketplace::models::Listing;

/// How much markup after a product anchor is searched for its image.
pub const IMAGE_LOOKAHEAD: usize = 400;

lazy_static! {
    static ref ANCHOR_REGEX: Regex = Regex::new(
        r#"(?is)<a\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#
    ).unwrap();

    // A possibly truncated <img ...> tag; the lookahead window may cut it short.
    static ref IMG_TAG_REGEX: Regex = Regex::new(r"(?is)<img\b[^>]*").unwrap();

    static ref DATA_SRC_REGEX: Regex = Regex::new(
        r#"(?is)\sdata-src\s*=\s*(?:"([^"]*)"|'([^']*)')"#
    ).unwrap();

    static ref SRC_REGEX: Regex = Regex::new(
        r#"(?is)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#
    ).unwrap();
}

pub struct PatternExtractor {
    path_prefix: String,
}

impl PatternExtractor {
    pub fn new(path_prefix: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
        }
    }

    /// First image tag carrying a usable reference in `window`.
    fn find_image(window: &str) -> Option<String> {
        IMG_TAG_REGEX.find_iter(window).find_map(|tag| {
            let tag = tag.as_str();
            pick_image_url(
                quoted_value(DATA_SRC_REGEX.captures(tag).as_ref()),
                quoted_value(SRC_REGEX.captures(tag).as_ref()),
            )
        })
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new("/en/OnePiece/")
    }
}

impl ListingExtractor for PatternExtractor {
    fn extract(&self, markup: &str, site_base_url: &str) -> Vec<Listing> {
        let mut collector = ListingCollector::new();

        let anchors: Vec<Captures<'_>> = ANCHOR_REGEX
            .captures_iter(markup)
            .filter(|anchor| {
                quoted_value(Some(anchor)).is_some_and(|href| href.contains(&self.path_prefix))
            })
            .collect();

        for (i, anchor) in anchors.iter().enumerate() {
            let Some(href) = quoted_value(Some(anchor)) else {
                continue;
            };

            let source_url = resolve_source_url(href, site_base_url);
            if collector.has_seen(&source_url) {
                continue;
            }

            let inner = anchor.get(3).map(|m| m.as_str()).unwrap_or_default();
            let name = clean_text(inner);

            // Image inside the anchor wins; otherwise look after it, but never
            // past the next product anchor.
            let anchor_end = anchor.get(0).map(|m| m.end()).unwrap_or(markup.len());
            let window_end = anchors
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(markup.len());
            let image_url = Self::find_image(inner).or_else(|| {
                Self::find_image(lookahead(&markup[..window_end], anchor_end, IMAGE_LOOKAHEAD))
            });

            collector.push(Listing::from_text(source_url, name, image_url));
            if collector.is_full() {
                break;
            }
        }

        collector.into_listings()
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

/// Value of whichever of the two quote-style groups (1 or 2) matched.
fn quoted_value<'t>(captures: Option<&Captures<'t>>) -> Option<&'t str> {
    let captures = captures?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
}

/// Up to `len` bytes of `text` starting at `start`, shortened to a char boundary.
fn lookahead(text: &str, start: usize, len: usize) -> &str {
    let start = start.min(text.len());
    let mut end = start.saturating_add(len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::marketplace::models::Language;

    const BASE: &str = "https://www.cardmarket.com";

    fn extract(markup: &str) -> Vec<Listing> {
        PatternExtractor::default().extract(markup, BASE)
    }

    #[test]
    fn test_single_listing_all_fields() {
        let markup = r#"
            <div class="row">
              <a href="/en/OnePiece/Products/123">OP05-119 English</a>
              <div class="thumb"><img src="/img/placeholder.gif" data-src="http://img/x.png"></div>
            </div>
        "#;

        let listings = extract(markup);

        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.id_code.as_deref(), Some("OP05-119"));
        assert_eq!(listing.name.as_deref(), Some("OP05-119 English"));
        assert_eq!(listing.language, Some(Language::English));
        assert_eq!(listing.image_url.as_deref(), Some("http://img/x.png"));
        assert_eq!(
            listing.source_url,
            "https://www.cardmarket.com/en/OnePiece/Products/123"
        );
    }

    #[test]
    fn test_ignores_links_outside_path_prefix() {
        let markup = r#"
            <a href="/en/Magic/Products/1">OP01-001</a>
            <a href="/en/OnePiece/Products/2">Zoro</a>
            <a data-href="/en/OnePiece/Products/3">not a link</a>
        "#;

        let listings = extract(markup);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name.as_deref(), Some("Zoro"));
        assert_eq!(listings[0].id_code, None);
        assert_eq!(listings[0].language, None);
    }

    #[test]
    fn test_strips_inner_markup_and_treats_empty_text_as_absent() {
        let markup = r#"
            <a class="x" href='/en/OnePiece/Products/7'><span>st10-002</span> <b>Japanese</b></a>
            <a href="/en/OnePiece/Products/8"><img src="thumb.png"></a>
        "#;

        let listings = extract(markup);

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name.as_deref(), Some("st10-002 Japanese"));
        assert_eq!(listings[0].id_code.as_deref(), Some("ST10-002"));
        assert_eq!(listings[0].language, Some(Language::Japanese));
        assert_eq!(listings[1].name, None);
        assert_eq!(listings[1].id_code, None);
    }

    #[test]
    fn test_duplicate_urls_differing_by_query_keep_first() {
        let markup = r#"
            <a href="/en/OnePiece/Products/123?language=1">First</a>
            <a href="/en/OnePiece/Products/123?language=2">Second</a>
        "#;

        let listings = extract(markup);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name.as_deref(), Some("First"));
        assert_eq!(
            listings[0].source_url,
            "https://www.cardmarket.com/en/OnePiece/Products/123"
        );
    }

    #[test]
    fn test_caps_at_max_listings_in_order() {
        let markup: String = (0..60)
            .map(|i| format!("<a href=\"/en/OnePiece/Products/{}\">Card {}</a>\n", i, i))
            .collect();

        let listings = extract(&markup);

        assert_eq!(listings.len(), super::super::MAX_LISTINGS);
        for (i, listing) in listings.iter().enumerate() {
            assert_eq!(
                listing.source_url,
                format!("https://www.cardmarket.com/en/OnePiece/Products/{}", i)
            );
        }
    }

    #[test]
    fn test_image_outside_lookahead_is_not_attributed() {
        let padding = " ".repeat(IMAGE_LOOKAHEAD + 10);
        let markup = format!(
            "<a href=\"/en/OnePiece/Products/1\">Card</a>{}<img src=\"http://img/far.png\">",
            padding
        );

        let listings = extract(&markup);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].image_url, None);
    }

    #[test]
    fn test_image_inside_anchor_belongs_to_that_listing() {
        let markup = r#"
            <a href="/en/OnePiece/Products/1"><img data-src="http://img/1.png">OP01-001</a>
            <a href="/en/OnePiece/Products/2"><img data-src="http://img/2.png">OP01-002</a>
            <a href="/en/OnePiece/Products/3"><img data-src="http://img/3.png">OP01-003</a>
        "#;

        let images: Vec<Option<String>> =
            extract(markup).into_iter().map(|l| l.image_url).collect();

        assert_eq!(
            images,
            vec![
                Some("http://img/1.png".to_string()),
                Some("http://img/2.png".to_string()),
                Some("http://img/3.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_lookahead_stops_at_next_product_anchor() {
        let markup = r#"
            <a href="/en/OnePiece/Products/1">OP01-001</a>
            <a href="/en/OnePiece/Products/2">OP01-002</a>
            <img data-src="http://img/2.png">
        "#;

        let listings = extract(markup);

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].image_url, None);
        assert_eq!(listings[1].image_url.as_deref(), Some("http://img/2.png"));
    }

    #[test]
    fn test_image_falls_back_to_src() {
        let markup = r#"<a href="/en/OnePiece/Products/1">Card</a><img alt="x" src="http://img/s.png">"#;
        assert_eq!(
            extract(markup)[0].image_url.as_deref(),
            Some("http://img/s.png")
        );
    }

    #[test]
    fn test_malformed_markup_yields_empty() {
        assert!(extract("").is_empty());
        assert!(extract("<a href=\"/en/OnePiece/Products/1\">never closed").is_empty());
        assert!(extract("<<<>>> <a <img").is_empty());
        assert!(extract("<html><body>Access denied</body></html>").is_empty());
    }

    #[test]
    fn test_lookahead_respects_char_boundaries() {
        let text = "ab\u{00e9}\u{00e9}cd";
        assert_eq!(lookahead(text, 0, 3), "ab");
        assert_eq!(lookahead(text, 2, 100), "\u{00e9}\u{00e9}cd");
        assert_eq!(lookahead(text, 100, 5), "");
    }
}
