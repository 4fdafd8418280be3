//! Search by photo: average-hash comparison against candidate listing images.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use image::imageops::FilterType;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ImageMatchConfig;
use crate::kernel::{BaseImageMatcher, BaseMarketplaceFetcher, MatchError};

use super::models::Listing;

/// Candidate images fetched at once per search.
pub const CANDIDATE_FETCH_CONCURRENCY: usize = 4;

/// 64-bit average hash: 8x8 grayscale, one bit per pixel brighter than the mean.
pub fn average_hash(bytes: &[u8]) -> Result<u64> {
    let image = image::load_from_memory(bytes).context("Failed to decode image")?;
    let pixels = image
        .grayscale()
        .resize_exact(8, 8, FilterType::Lanczos3)
        .to_luma8();

    let mean = pixels.pixels().map(|p| p.0[0] as f64).sum::<f64>() / 64.0;

    Ok(pixels
        .pixels()
        .enumerate()
        .filter(|(_, p)| p.0[0] as f64 > mean)
        .fold(0u64, |hash, (i, _)| hash | (1 << (63 - i))))
}

pub fn hash_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

async fn hash_off_thread(bytes: Vec<u8>) -> Result<u64> {
    tokio::task::spawn_blocking(move || average_hash(&bytes))
        .await
        .context("Image hashing task failed")?
}

pub struct AverageHashMatcher {
    fetcher: Arc<dyn BaseMarketplaceFetcher>,
    max_distance: u32,
    known_languages_only: bool,
}

impl AverageHashMatcher {
    pub fn new(fetcher: Arc<dyn BaseMarketplaceFetcher>, config: &ImageMatchConfig) -> Self {
        Self {
            fetcher,
            max_distance: config.max_distance,
            known_languages_only: config.known_languages_only,
        }
    }

    /// Hash of a candidate's image; `None` when it cannot be fetched or decoded.
    async fn candidate_hash(&self, image_url: &str) -> Option<u64> {
        let response = match self.fetcher.get(image_url).await {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                debug!(url = %image_url, status = response.status, "Candidate image unavailable");
                return None;
            }
            Err(e) => {
                debug!(url = %image_url, error = %e, "Candidate image fetch failed");
                return None;
            }
        };

        match hash_off_thread(response.body).await {
            Ok(hash) => Some(hash),
            Err(e) => {
                debug!(url = %image_url, error = %e, "Candidate image not decodable");
                None
            }
        }
    }
}

#[async_trait]
impl BaseImageMatcher for AverageHashMatcher {
    async fn hash_target(&self, target: &[u8]) -> Result<u64, MatchError> {
        hash_off_thread(target.to_vec()).await.map_err(|e| {
            warn!(error = %e, "Rejected image for matching");
            MatchError::InvalidImage
        })
    }

    async fn match_hash(
        &self,
        target_hash: u64,
        candidates: Vec<Listing>,
    ) -> Result<Vec<Listing>, MatchError> {
        let eligible: Vec<Listing> = candidates
            .into_iter()
            .filter(|c| !self.known_languages_only || c.language.is_some())
            .filter(|c| c.image_url.is_some())
            .collect();

        // `buffered` keeps results in candidate order.
        let lookups: Vec<_> = eligible
            .iter()
            .map(|c| self.candidate_hash(c.image_url.as_deref().unwrap_or_default()))
            .collect();
        let hashes: Vec<Option<u64>> = stream::iter(lookups)
            .buffered(CANDIDATE_FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut matched = Vec::new();
        for (candidate, hash) in eligible.into_iter().zip(hashes) {
            let Some(hash) = hash else {
                continue;
            };

            let distance = hash_distance(target_hash, hash);
            debug!(url = %candidate.source_url, distance, "Compared candidate image");
            if distance <= self.max_distance {
                matched.push(candidate);
            }
        }

        Ok(matched)
    }
}

/// Stand-in used when image matching is disabled.
pub struct UnavailableImageMatcher;

#[async_trait]
impl BaseImageMatcher for UnavailableImageMatcher {
    fn is_available(&self) -> bool {
        false
    }

    async fn hash_target(&self, _target: &[u8]) -> Result<u64, MatchError> {
        Err(MatchError::Unavailable)
    }

    async fn match_hash(
        &self,
        _target_hash: u64,
        _candidates: Vec<Listing>,
    ) -> Result<Vec<Listing>, MatchError> {
        Err(MatchError::Unavailable)
    }
}

/// Matcher for the configured capability.
pub fn image_matcher_for(
    config: &ImageMatchConfig,
    fetcher: Arc<dyn BaseMarketplaceFetcher>,
) -> Arc<dyn BaseImageMatcher> {
    if config.enabled {
        Arc::new(AverageHashMatcher::new(fetcher, config))
    } else {
        Arc::new(UnavailableImageMatcher)
    }
}
