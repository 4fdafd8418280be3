//! Outbound HTTP for the marketplace and candidate images.
//!
//! The marketplace rejects default client identities, so every request goes
//! out with a desktop browser User-Agent and an English Accept-Language.
//! No retries: one request, bounded by the client timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::debug;

use super::{BaseMarketplaceFetcher, FetchResponse};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// reqwest-backed fetcher shared by every request handler.
#[derive(Clone)]
pub struct HttpMarketplaceFetcher {
    client: reqwest::Client,
}

impl HttpMarketplaceFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl BaseMarketplaceFetcher for HttpMarketplaceFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        debug!(url = %url, "Fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
