// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    BaseMarketplaceFetcher, BaseRateProvider, BaseRecordStore, FetchResponse, LocalUploadSink,
    MemoryRecordStore, ServerDeps,
};
use crate::config::{ExtractorBackend, ImageMatchConfig, MarketplaceConfig};
use crate::domains::marketplace::extract::extractor_for;
use crate::domains::marketplace::image_match::image_matcher_for;
use crate::domains::marketplace::MarketplaceSearch;

// =============================================================================
// Mock Marketplace Fetcher
// =============================================================================

/// Serves canned responses by exact URL; any other URL is a transport failure.
#[derive(Default)]
pub struct MockMarketplaceFetcher {
    responses: Mutex<HashMap<String, FetchResponse>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockMarketplaceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, status: u16, html: &str) -> Self {
        self.with_bytes(url, status, html.as_bytes().to_vec())
    }

    pub fn with_bytes(self, url: &str, status: u16, body: Vec<u8>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), FetchResponse { status, body });
        self
    }

    /// Every URL requested, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of requests that were outstanding at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseMarketplaceFetcher for MockMarketplaceFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        self.calls.lock().unwrap().push(url.to_string());

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        // Let other requests start before this one completes.
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("operation timed out: {}", url))
    }
}

// =============================================================================
// Mock Rate Provider
// =============================================================================

#[derive(Default)]
pub struct MockRateProvider {
    rates: HashMap<(String, String), f64>,
}

impl MockRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

#[async_trait]
impl BaseRateProvider for MockRateProvider {
    async fn rate(&self, from: &str, to: &str) -> Result<f64> {
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Rate API error"))
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builder for `ServerDeps` wired to mocks and an in-memory store.
pub struct TestDependencies {
    pub fetcher: Arc<MockMarketplaceFetcher>,
    pub rates: Arc<MockRateProvider>,
    pub store: Arc<MemoryRecordStore>,
    pub marketplace: MarketplaceConfig,
    pub image_match: ImageMatchConfig,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(MockMarketplaceFetcher::new()),
            rates: Arc::new(MockRateProvider::new()),
            store: Arc::new(MemoryRecordStore::new()),
            marketplace: MarketplaceConfig::default(),
            image_match: ImageMatchConfig::default(),
        }
    }

    pub fn mock_fetcher(mut self, fetcher: MockMarketplaceFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn mock_rates(mut self, rates: MockRateProvider) -> Self {
        self.rates = Arc::new(rates);
        self
    }

    pub fn extractor(mut self, backend: ExtractorBackend) -> Self {
        self.marketplace.extractor = backend;
        self
    }

    pub fn image_matching(mut self, config: ImageMatchConfig) -> Self {
        self.image_match = config;
        self
    }

    /// Assemble `ServerDeps`, storing uploads under `upload_dir`.
    pub async fn into_server_deps(self, upload_dir: impl Into<PathBuf>) -> Result<ServerDeps> {
        let fetcher: Arc<dyn BaseMarketplaceFetcher> = self.fetcher.clone();
        let store: Arc<dyn BaseRecordStore> = self.store.clone();

        let search = MarketplaceSearch::new(
            fetcher.clone(),
            extractor_for(self.marketplace.extractor, &self.marketplace.path_prefix),
            self.marketplace,
        );

        Ok(ServerDeps {
            store,
            uploads: Arc::new(LocalUploadSink::new(upload_dir).await?),
            search: Arc::new(search),
            image_matcher: image_matcher_for(&self.image_match, fetcher),
            rates: self.rates,
        })
    }
}
