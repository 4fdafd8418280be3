// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (search fallback, collection validation) lives in the domains
// and is written against these traits.
//
// Naming convention: Base* for trait names (e.g., BaseRecordStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domains::marketplace::models::Listing;

// =============================================================================
// Outbound fetch (Infrastructure)
// =============================================================================

/// Status and body of a completed outbound GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait BaseMarketplaceFetcher: Send + Sync {
    /// Issue one GET. `Err` means transport failure (connect, timeout, read);
    /// any HTTP status, including errors, comes back as `Ok`.
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

// =============================================================================
// Record store (Infrastructure - generic document persistence)
// =============================================================================

/// One persisted document.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub kind: String,
    pub doc: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// Top-level field equality filter; empty matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter(pub Map<String, Value>);

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        self.0.iter().all(|(k, v)| doc.get(k) == Some(v))
    }
}

/// Health snapshot reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub kinds: Vec<String>,
}

impl StoreHealth {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[async_trait]
pub trait BaseRecordStore: Send + Sync {
    /// Persist a new document of `kind`, returning its store-assigned id.
    async fn create(&self, kind: &str, doc: Map<String, Value>) -> Result<Uuid>;

    /// Documents of `kind` matching `filter`, oldest first.
    async fn list(&self, kind: &str, filter: &RecordFilter) -> Result<Vec<StoredRecord>>;

    async fn get(&self, kind: &str, id: Uuid) -> Result<Option<StoredRecord>>;

    /// Merge `fields` into an existing document. Returns false if no such record.
    async fn update(&self, kind: &str, id: Uuid, fields: Map<String, Value>) -> Result<bool>;

    async fn health(&self) -> StoreHealth;

    /// Release the underlying connections. Called once on shutdown.
    async fn close(&self);
}

// =============================================================================
// Upload sink (Infrastructure - file storage)
// =============================================================================

#[async_trait]
pub trait BaseUploadSink: Send + Sync {
    /// Store bytes under (a sanitized form of) `suggested_name`, returning the
    /// URL the file is served at.
    async fn store(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String>;
}

// =============================================================================
// Currency rates (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseRateProvider: Send + Sync {
    /// Conversion rate for one unit of `from` expressed in `to`.
    async fn rate(&self, from: &str, to: &str) -> Result<f64>;
}

// =============================================================================
// Image matching (optional capability)
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Image matching is not available on this deployment")]
    Unavailable,

    #[error("Invalid image upload")]
    InvalidImage,
}

#[async_trait]
pub trait BaseImageMatcher: Send + Sync {
    /// False when the capability is switched off on this deployment.
    fn is_available(&self) -> bool {
        true
    }

    /// Perceptual hash of an uploaded image. Needs no outbound calls.
    async fn hash_target(&self, target: &[u8]) -> std::result::Result<u64, MatchError>;

    /// Candidates whose image hash is within threshold of `target_hash`.
    async fn match_hash(
        &self,
        target_hash: u64,
        candidates: Vec<Listing>,
    ) -> std::result::Result<Vec<Listing>, MatchError>;

    /// Candidates whose image is perceptually close to `target`.
    async fn match_by_image(
        &self,
        target: &[u8],
        candidates: Vec<Listing>,
    ) -> std::result::Result<Vec<Listing>, MatchError> {
        let target_hash = self.hash_target(target).await?;
        self.match_hash(target_hash, candidates).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(RecordFilter::all().matches(&doc(json!({"a": 1}))));
        assert!(RecordFilter::all().matches(&Map::new()));
    }

    #[test]
    fn test_filter_requires_every_field() {
        let filter = RecordFilter::all().eq("idCode", "OP05-119").eq("language", "EN");
        assert!(filter.matches(&doc(json!({"idCode": "OP05-119", "language": "EN", "q": 2}))));
        assert!(!filter.matches(&doc(json!({"idCode": "OP05-119", "language": "JP"}))));
        assert!(!filter.matches(&doc(json!({"idCode": "OP05-119"}))));
    }

    #[test]
    fn test_fetch_response_status() {
        let ok = FetchResponse { status: 200, body: b"<html>".to_vec() };
        assert!(ok.is_ok());
        assert_eq!(ok.text(), "<html>");
        assert!(!FetchResponse { status: 403, body: vec![] }.is_ok());
    }
}
