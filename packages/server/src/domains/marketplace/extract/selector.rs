//! Structural extractor: CSS selectors over the search page's result rows.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use super::{clean_text, pick_image_url, resolve_source_url, ListingCollector, ListingExtractor};
use crate::domains::marketplace::models::{detect_language, find_id_code, Listing};

lazy_static! {
    static ref ROW_SELECTOR: Selector =
        Selector::parse(".table-body .row, .product-list .row").unwrap();
    static ref ALT_ROW_SELECTOR: Selector = Selector::parse(".search-results .row").unwrap();
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").unwrap();
    static ref IMG_SELECTOR: Selector = Selector::parse("img").unwrap();
    static ref LANGUAGE_FLAG_SELECTOR: Selector =
        Selector::parse(".product-attributes img[title]").unwrap();
}

pub struct SelectorExtractor {
    path_prefix: String,
}

impl SelectorExtractor {
    pub fn new(path_prefix: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
        }
    }

    /// Product page link of a row; links to the product section win over
    /// other links under the path prefix.
    fn find_link<'a>(&self, row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        let products = format!("{}Products", self.path_prefix);
        let links: Vec<ElementRef<'a>> = row
            .select(&LINK_SELECTOR)
            .filter(|a| {
                a.value()
                    .attr("href")
                    .map(|href| href.contains(&self.path_prefix))
                    .unwrap_or(false)
            })
            .collect();

        links
            .iter()
            .find(|a| {
                a.value()
                    .attr("href")
                    .map(|href| href.contains(&products))
                    .unwrap_or(false)
            })
            .or_else(|| links.first())
            .copied()
    }

    fn find_image(row: &ElementRef<'_>) -> Option<String> {
        row.select(&IMG_SELECTOR).find_map(|img| {
            pick_image_url(img.value().attr("data-src"), img.value().attr("src"))
        })
    }

    fn row_listing(&self, row: &ElementRef<'_>, site_base_url: &str) -> Option<Listing> {
        let link = self.find_link(row)?;
        let href = link.value().attr("href")?;
        let source_url = resolve_source_url(href, site_base_url);

        let name = clean_text(&link.text().collect::<Vec<_>>().join(" "));
        let row_text = row.text().collect::<Vec<_>>().join(" ");

        let language = row
            .select(&LANGUAGE_FLAG_SELECTOR)
            .find_map(|flag| flag.value().attr("title").and_then(detect_language))
            .or_else(|| detect_language(&row_text));

        Some(Listing {
            id_code: find_id_code(&row_text),
            name,
            language,
            image_url: Self::find_image(row),
            source_url,
            source: Default::default(),
        })
    }
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self::new("/en/OnePiece/")
    }
}

impl ListingExtractor for SelectorExtractor {
    fn extract(&self, markup: &str, site_base_url: &str) -> Vec<Listing> {
        let document = Html::parse_document(markup);

        let mut rows: Vec<ElementRef<'_>> = document.select(&ROW_SELECTOR).collect();
        if rows.is_empty() {
            rows = document.select(&ALT_ROW_SELECTOR).collect();
        }

        let mut collector = ListingCollector::new();
        for row in &rows {
            if let Some(listing) = self.row_listing(row, site_base_url) {
                collector.push(listing);
            }
            if collector.is_full() {
                break;
            }
        }
        collector.into_listings()
    }

    fn name(&self) -> &'static str {
        "selector"
    }
}
