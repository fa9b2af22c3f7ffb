//! In-memory stand-ins for the managed services, for handler and service tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::config::AppConfig;
use crate::core::error::AppError;
use crate::features::files::FileService;
use crate::modules::document_store::DocumentStore;
use crate::modules::storage::ObjectStorage;
use crate::shared::clock::Clock;
use crate::shared::constants::OBJECT_CONTAINER_NAME;

/// Object storage double that keeps objects in a map and counts writes
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: AtomicUsize,
    failure: Option<String>,
}

impl InMemoryStorage {
    /// Every upload fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn url_for(key: &str) -> String {
        format!("memory://{}/{}", OBJECT_CONTAINER_NAME, key)
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Number of upload attempts, failed ones included
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, AppError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AppError::Storage(message.clone()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(Self::url_for(key))
    }

    fn container_name(&self) -> String {
        OBJECT_CONTAINER_NAME.to_string()
    }
}

/// Document store double with primary-key conflicts and injectable failures
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<Vec<(String, DateTime<Utc>, Value)>>,
    insert_attempts: AtomicUsize,
    inserts: AtomicUsize,
    queries: AtomicUsize,
    insert_failure: Option<String>,
    query_failure: Option<String>,
}

impl InMemoryDocumentStore {
    pub fn failing_inserts(message: &str) -> Self {
        Self {
            insert_failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_queries(message: &str) -> Self {
        Self {
            query_failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Number of insert calls, failed ones included
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Number of documents successfully inserted
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_item(
        &self,
        id: &str,
        sort_key: DateTime<Utc>,
        document: Value,
    ) -> Result<(), AppError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.insert_failure {
            return Err(AppError::Database(message.clone()));
        }

        let mut documents = self.documents.lock().unwrap();
        if documents.iter().any(|(existing, _, _)| existing == id) {
            return Err(AppError::Database(format!(
                "Entity with the specified id already exists: {}",
                id
            )));
        }
        documents.push((id.to_string(), sort_key, document));
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query_all_desc(&self) -> Result<Vec<Value>, AppError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.query_failure {
            return Err(AppError::Database(message.clone()));
        }

        let mut documents = self.documents.lock().unwrap().clone();
        documents.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
        Ok(documents.into_iter().map(|(_, _, doc)| doc).collect())
    }
}

/// Clock pinned to a settable instant
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_millis_opt(millis).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Doubles wired into a service, kept so tests can inspect them afterwards
pub struct TestContext {
    pub storage: Arc<InMemoryStorage>,
    pub documents: Arc<InMemoryDocumentStore>,
    pub clock: Arc<FixedClock>,
    pub service: Arc<FileService>,
}

impl TestContext {
    pub fn new(
        storage: InMemoryStorage,
        documents: InMemoryDocumentStore,
        clock: FixedClock,
    ) -> Self {
        let storage = Arc::new(storage);
        let documents = Arc::new(documents);
        let clock = Arc::new(clock);
        let service = Arc::new(FileService::new(
            storage.clone(),
            documents.clone(),
            clock.clone(),
        ));

        Self {
            storage,
            documents,
            clock,
            service,
        }
    }

    pub fn at_millis(millis: i64) -> Self {
        Self::new(
            InMemoryStorage::default(),
            InMemoryDocumentStore::default(),
            FixedClock::at_millis(millis),
        )
    }
}

pub fn test_app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_allowed_origins: vec!["*".to_string()],
        max_upload_size: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_store_counts_failed_attempts() {
        let store = InMemoryDocumentStore::failing_inserts("throttled");
        let err = store
            .create_item("1", Utc::now(), Value::Null)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.insert_attempts(), 1);
        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test]
    async fn test_document_store_counts_conflicts_as_attempts() {
        let store = InMemoryDocumentStore::default();
        store.create_item("1", Utc::now(), Value::Null).await.unwrap();
        assert!(store.create_item("1", Utc::now(), Value::Null).await.is_err());

        assert_eq!(store.insert_attempts(), 2);
        assert_eq!(store.insert_count(), 1);
    }
}
