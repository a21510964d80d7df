//! `PostgreSQL` record store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, NoTls, Row};
use tracing::debug;

use crate::{NewRecord, RecordStore, StorageError, StorageResult, StoredRecord};

/// `PostgreSQL` connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("POSTGRES_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            database: std::env::var("POSTGRES_DB")
                .unwrap_or_else(|_| "element_insight".to_string()),
            user: std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("POSTGRES_PASSWORD").unwrap_or_default(),
        }
    }
}

impl PostgresConfig {
    /// Build a connection string from the parts
    #[must_use]
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.database, self.user, self.password
        )
    }
}

/// `PostgreSQL` [`RecordStore`] implementation
pub struct PostgresRecordStore {
    client: Client,
}

impl PostgresRecordStore {
    /// Connect using a [`PostgresConfig`]
    pub async fn new(config: &PostgresConfig) -> StorageResult<Self> {
        Self::connect(&config.connection_string()).await
    }

    /// Connect using a full connection URL (`DATABASE_URL` style)
    pub async fn from_url(url: &str) -> StorageResult<Self> {
        Self::connect(url).await
    }

    async fn connect(params: &str) -> StorageResult<Self> {
        let (client, connection) = tokio_postgres::connect(params, NoTls)
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        // Drive the connection in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("postgres connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    /// Create the records table if it does not exist
    pub async fn init_schema(&self) -> StorageResult<()> {
        self.client
            .execute(
                r"
                CREATE TABLE IF NOT EXISTS records (
                    id BIGSERIAL PRIMARY KEY,
                    image_data BYTEA NOT NULL,
                    image_ocr_data TEXT NOT NULL,
                    outer_html TEXT NOT NULL,
                    page_source TEXT,
                    inference TEXT,
                    page_summary TEXT
                )
                ",
                &[],
            )
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        debug!("records schema ready");
        Ok(())
    }
}

fn record_from_row(row: &Row) -> StoredRecord {
    StoredRecord {
        id: row.get("id"),
        image_data: row.get("image_data"),
        image_ocr_data: row.get("image_ocr_data"),
        outer_html: row.get("outer_html"),
        page_source: row.get("page_source"),
        inference: row.get("inference"),
        page_summary: row.get("page_summary"),
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, record: NewRecord) -> StorageResult<i64> {
        let row = self
            .client
            .query_one(
                r"
                INSERT INTO records (image_data, image_ocr_data, outer_html, page_source)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
                &[
                    &record.image_data,
                    &record.image_ocr_data,
                    &record.outer_html,
                    &record.page_source,
                ],
            )
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        Ok(row.get(0))
    }

    async fn get(&self, id: i64) -> StorageResult<Option<StoredRecord>> {
        let row = self
            .client
            .query_opt("SELECT * FROM records WHERE id = $1", &[&id])
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn list_ids(&self) -> StorageResult<Vec<i64>> {
        let rows = self
            .client
            .query("SELECT id FROM records ORDER BY id", &[])
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> StorageResult<Vec<StoredRecord>> {
        let id_list: Vec<i64> = ids.to_vec();
        let rows = self
            .client
            .query(
                "SELECT * FROM records WHERE id = ANY($1) ORDER BY id",
                &[&id_list],
            )
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn set_inference(&self, id: i64, inference: Option<String>) -> StorageResult<()> {
        let updated = self
            .client
            .execute(
                "UPDATE records SET inference = $2 WHERE id = $1",
                &[&id, &inference],
            )
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        if updated == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    async fn set_page_summary(&self, id: i64, page_summary: Option<String>) -> StorageResult<()> {
        let updated = self
            .client
            .execute(
                "UPDATE records SET page_summary = $2 WHERE id = $1",
                &[&id, &page_summary],
            )
            .await
            .map_err(|e| StorageError::Postgres(e.to_string()))?;

        if updated == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }
}
