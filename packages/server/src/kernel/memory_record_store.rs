//! In-process record store for development without a database, and for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BaseRecordStore, RecordFilter, StoreHealth, StoredRecord};

#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BaseRecordStore for MemoryRecordStore {
    async fn create(&self, kind: &str, doc: Map<String, Value>) -> Result<Uuid> {
        let id = Uuid::now_v7();
        self.records.write().await.push(StoredRecord {
            id,
            kind: kind.to_string(),
            doc,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self, kind: &str, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        // Insertion order is creation order.
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.kind == kind && filter.matches(&r.doc))
            .cloned()
            .collect())
    }

    async fn get(&self, kind: &str, id: Uuid) -> Result<Option<StoredRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.kind == kind && r.id == id)
            .cloned())
    }

    async fn update(&self, kind: &str, id: Uuid, fields: Map<String, Value>) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.kind == kind && r.id == id) {
            Some(record) => {
                record.doc.extend(fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health(&self) -> StoreHealth {
        let mut kinds: Vec<String> = self
            .records
            .read()
            .await
            .iter()
            .map(|r| r.kind.clone())
            .collect();
        kinds.sort();
        kinds.dedup();

        StoreHealth {
            backend: "memory",
            status: "ok".to_string(),
            error: None,
            kinds,
        }
    }

    async fn close(&self) {}
}
