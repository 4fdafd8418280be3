//! Postgres-backed record store: JSONB documents in a single `records` table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{BaseRecordStore, RecordFilter, StoreHealth, StoredRecord};

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    kind: String,
    doc: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
}

impl From<RecordRow> for StoredRecord {
    fn from(row: RecordRow) -> Self {
        StoredRecord {
            id: row.id,
            kind: row.kind,
            doc: row.doc.0,
            created_at: row.created_at,
        }
    }
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations complete");

        Ok(Self { pool })
    }
}

#[async_trait]
impl BaseRecordStore for PgRecordStore {
    async fn create(&self, kind: &str, doc: Map<String, Value>) -> Result<Uuid> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO records (id, kind, doc) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(kind)
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert {} record", kind))?;
        Ok(id)
    }

    async fn list(&self, kind: &str, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, kind, doc, created_at
            FROM records
            WHERE kind = $1 AND doc @> $2
            ORDER BY created_at, id
            "#,
        )
        .bind(kind)
        .bind(Json(filter.0.clone()))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list {} records", kind))?;

        Ok(rows.into_iter().map(StoredRecord::from).collect())
    }

    async fn get(&self, kind: &str, id: Uuid) -> Result<Option<StoredRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, kind, doc, created_at FROM records WHERE kind = $1 AND id = $2",
        )
        .bind(kind)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load {} record {}", kind, id))?;

        Ok(row.map(StoredRecord::from))
    }

    async fn update(&self, kind: &str, id: Uuid, fields: Map<String, Value>) -> Result<bool> {
        let result = sqlx::query("UPDATE records SET doc = doc || $3 WHERE kind = $1 AND id = $2")
            .bind(kind)
            .bind(id)
            .bind(Json(fields))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update {} record {}", kind, id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health(&self) -> StoreHealth {
        let kinds_query = tokio::time::timeout(
            Duration::from_secs(5),
            sqlx::query_scalar::<_, String>(
                "SELECT DISTINCT kind FROM records ORDER BY kind LIMIT 10",
            )
            .fetch_all(&self.pool),
        )
        .await;

        let (status, error, kinds) = match kinds_query {
            Ok(Ok(kinds)) => ("ok", None, kinds),
            Ok(Err(e)) => ("error", Some(format!("Query failed: {}", e)), vec![]),
            Err(_) => ("error", Some("Query timeout (>5s)".to_string()), vec![]),
        };

        StoreHealth {
            backend: "postgres",
            status: status.to_string(),
            error,
            kinds,
        }
    }

    async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}
