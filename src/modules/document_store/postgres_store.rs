//! Postgres-backed document store
//!
//! One table per collection: `id TEXT PRIMARY KEY, uploaded_at TIMESTAMPTZ, document JSONB`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::DocumentStore;
use crate::core::config::DocumentStoreConfig;
use crate::core::error::AppError;
use crate::shared::validation::COLLECTION_NAME_REGEX;

pub struct PostgresDocumentStore {
    pool: PgPool,
    collection: String,
    insert_sql: String,
    query_all_sql: String,
}

impl PostgresDocumentStore {
    /// Connect to the configured database and make sure the collection table exists
    pub async fn connect(config: &DocumentStoreConfig) -> Result<Self, AppError> {
        let options = PgConnectOptions::from_str(&config.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid DOCUMENT_DB_URI: {}", e)))?
            .password(&config.access_key)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect_with(options)
            .await?;

        let store = Self::new(pool, &config.container)?;
        store.ensure_collection_exists().await?;

        info!(
            "Document store connected: database={}, collection={}",
            config.database, store.collection
        );

        Ok(store)
    }

    /// Wrap an existing pool. The collection name is interpolated into SQL, so it is validated here.
    pub fn new(pool: PgPool, collection: &str) -> Result<Self, AppError> {
        if !COLLECTION_NAME_REGEX.is_match(collection) {
            return Err(AppError::Internal(format!(
                "Invalid collection name '{}'",
                collection
            )));
        }

        Ok(Self {
            pool,
            collection: collection.to_string(),
            insert_sql: format!(
                "INSERT INTO {} (id, uploaded_at, document) VALUES ($1, $2, $3)",
                collection
            ),
            query_all_sql: format!(
                "SELECT document FROM {} ORDER BY uploaded_at DESC, id DESC",
                collection
            ),
        })
    }

    /// Create the collection table and its ordering index if missing
    pub async fn ensure_collection_exists(&self) -> Result<(), AppError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                uploaded_at TIMESTAMPTZ NOT NULL,
                document JSONB NOT NULL
            )
            "#,
            self.collection
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {0}_uploaded_at_idx ON {0} (uploaded_at DESC)",
            self.collection
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        debug!("Collection '{}' is ready", self.collection);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn create_item(
        &self,
        id: &str,
        sort_key: DateTime<Utc>,
        document: Value,
    ) -> Result<(), AppError> {
        sqlx::query(&self.insert_sql)
            .bind(id)
            .bind(sort_key)
            .bind(Json(document))
            .execute(&self.pool)
            .await?;

        debug!("Document '{}' inserted into '{}'", id, self.collection);
        Ok(())
    }

    async fn query_all_desc(&self) -> Result<Vec<Value>, AppError> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(&self.query_all_sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }
}
