//! Server dependencies (using traits for testability)
//!
//! The one container of shared handles. It is built explicitly in `main` (or
//! by `TestDependencies`) and handed to the router; nothing lives in globals.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::domains::marketplace::extract::extractor_for;
use crate::domains::marketplace::image_match::image_matcher_for;
use crate::domains::marketplace::MarketplaceSearch;
use crate::kernel::{
    BaseImageMatcher, BaseMarketplaceFetcher, BaseRateProvider, BaseRecordStore, BaseUploadSink,
    ExchangeRateClient, HttpMarketplaceFetcher, LocalUploadSink, MemoryRecordStore, PgRecordStore,
};

#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseRecordStore>,
    pub uploads: Arc<dyn BaseUploadSink>,
    pub search: Arc<MarketplaceSearch>,
    pub image_matcher: Arc<dyn BaseImageMatcher>,
    pub rates: Arc<dyn BaseRateProvider>,
}

impl ServerDeps {
    /// Wire production implementations from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn BaseRecordStore> = match &config.database_url {
            Some(url) => {
                Arc::new(PgRecordStore::connect(url, config.database_max_connections).await?)
            }
            None => {
                warn!("DATABASE_URL not set, collection records are kept in memory only");
                Arc::new(MemoryRecordStore::new())
            }
        };

        let fetcher: Arc<dyn BaseMarketplaceFetcher> =
            Arc::new(HttpMarketplaceFetcher::new(config.marketplace.timeout)?);

        let extractor = extractor_for(
            config.marketplace.extractor,
            &config.marketplace.path_prefix,
        );
        info!(extractor = extractor.name(), "Marketplace extractor selected");

        info!(
            enabled = config.image_match.enabled,
            max_distance = config.image_match.max_distance,
            known_languages_only = config.image_match.known_languages_only,
            "Image matching configured"
        );

        Ok(Self {
            store,
            uploads: Arc::new(LocalUploadSink::new(&config.upload_dir).await?),
            search: Arc::new(MarketplaceSearch::new(
                fetcher.clone(),
                extractor,
                config.marketplace.clone(),
            )),
            image_matcher: image_matcher_for(&config.image_match, fetcher),
            rates: Arc::new(ExchangeRateClient::new(config.rate_api_url.clone())?),
        })
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}
