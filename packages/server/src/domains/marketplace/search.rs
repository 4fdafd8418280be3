//! Marketplace search: one fetch, extraction, and the fallback policy.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::MarketplaceConfig;
use crate::kernel::BaseMarketplaceFetcher;

use super::extract::ListingExtractor;
use super::fallback::fallback;
use super::models::Listing;

pub struct MarketplaceSearch {
    fetcher: Arc<dyn BaseMarketplaceFetcher>,
    extractor: Arc<dyn ListingExtractor>,
    config: MarketplaceConfig,
}

impl MarketplaceSearch {
    pub fn new(
        fetcher: Arc<dyn BaseMarketplaceFetcher>,
        extractor: Arc<dyn ListingExtractor>,
        config: MarketplaceConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Search the marketplace for `query`.
    ///
    /// Never fails: transport errors, non-200 responses and pages with no
    /// recognizable listings all go to the fallback policy.
    pub async fn search(&self, query: &str) -> Vec<Listing> {
        let url = self.config.search_url(query);

        let response = match self.fetcher.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(query = %query, error = %e, "Marketplace unreachable, using fallback");
                return fallback(query, &self.config);
            }
        };

        if !response.is_ok() {
            warn!(
                query = %query,
                status = response.status,
                "Marketplace returned non-success status, using fallback"
            );
            return fallback(query, &self.config);
        }

        let listings = self
            .extractor
            .extract(&response.text(), &self.config.base_url);

        if listings.is_empty() {
            info!(
                query = %query,
                extractor = self.extractor.name(),
                "No listings extracted, using fallback"
            );
            return fallback(query, &self.config);
        }

        debug!(query = %query, count = listings.len(), "Marketplace search complete");
        listings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::marketplace::extract::PatternExtractor;
    use crate::kernel::test_dependencies::MockMarketplaceFetcher;

    fn search_with(fetcher: MockMarketplaceFetcher) -> (MarketplaceSearch, Arc<MockMarketplaceFetcher>) {
        let fetcher = Arc::new(fetcher);
        let search = MarketplaceSearch::new(
            fetcher.clone(),
            Arc::new(PatternExtractor::default()),
            MarketplaceConfig::default(),
        );
        (search, fetcher)
    }

    #[tokio::test]
    async fn test_returns_extracted_listings() {
        let config = MarketplaceConfig::default();
        let (search, fetcher) = search_with(MockMarketplaceFetcher::new().with_page(
            &config.search_url("luffy"),
            200,
            r#"<a href="/en/OnePiece/Products/1">OP01-001</a><a href="/en/OnePiece/Products/2">OP01-002</a>"#,
        ));

        let listings = search.search("luffy").await;

        assert_eq!(listings.len(), 2);
        assert_eq!(fetcher.calls(), vec![config.search_url("luffy")]);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let (search, _) = search_with(MockMarketplaceFetcher::new());

        let listings = search.search("OP05-119").await;

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id_code.as_deref(), Some("OP05-119"));
        assert!(search.search("random nonsense").await.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_falls_back_even_with_listings_in_body() {
        let config = MarketplaceConfig::default();
        let (search, _) = search_with(MockMarketplaceFetcher::new().with_page(
            &config.search_url("OP05-119"),
            403,
            r#"<a href="/en/OnePiece/Products/1">OP01-001</a>"#,
        ));

        let listings = search.search("OP05-119").await;

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].source_url, config.search_url("OP05-119"));
    }

    #[tokio::test]
    async fn test_empty_extraction_falls_back() {
        let config = MarketplaceConfig::default();
        let (search, _) = search_with(MockMarketplaceFetcher::new().with_page(
            &config.search_url("zoro"),
            200,
            "<html><body>Just a moment...</body></html>",
        ));

        assert!(search.search("zoro").await.is_empty());
    }
}
