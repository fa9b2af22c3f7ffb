//! Document store for file metadata
//!
//! Documents are schemaless JSON keyed by an id. Each document also carries a
//! timestamp used to order full-collection queries.

mod postgres_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::error::AppError;

pub use postgres_store::PostgresDocumentStore;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. An existing document with the same id is a conflict, not an overwrite.
    async fn create_item(
        &self,
        id: &str,
        sort_key: DateTime<Utc>,
        document: Value,
    ) -> Result<(), AppError>;

    /// Every document in the collection, newest `sort_key` first
    async fn query_all_desc(&self) -> Result<Vec<Value>, AppError>;
}
