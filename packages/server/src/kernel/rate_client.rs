//! Currency-rate passthrough backed by exchangerate.host.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::BaseRateProvider;

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default = "default_success")]
    success: bool,
    result: Option<f64>,
}

fn default_success() -> bool {
    true
}

pub struct ExchangeRateClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExchangeRateClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

fn parse_rate(body: &str) -> Result<f64> {
    let response: ConvertResponse =
        serde_json::from_str(body).context("Rate API returned malformed JSON")?;
    if !response.success {
        anyhow::bail!("Rate API error");
    }
    response.result.context("Rate API response has no result")
}

#[async_trait]
impl BaseRateProvider for ExchangeRateClient {
    async fn rate(&self, from: &str, to: &str) -> Result<f64> {
        let body = self
            .client
            .get(format!("{}/convert", self.base_url))
            .query(&[("from", from), ("to", to)])
            .send()
            .await
            .context("Rate API request failed")?
            .text()
            .await
            .context("Failed to read rate API response")?;

        parse_rate(&body)
    }
}
