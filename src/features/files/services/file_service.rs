use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;
use crate::modules::document_store::DocumentStore;
use crate::modules::storage::ObjectStorage;
use crate::shared::clock::Clock;
use crate::shared::constants::DEFAULT_UPLOADER;

/// Service for file operations
pub struct FileService {
    storage: Arc<dyn ObjectStorage>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl FileService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            documents,
            clock,
        }
    }

    /// Upload a file to storage and save its metadata document
    ///
    /// The object name and record id both come from one millisecond timestamp, so two
    /// uploads landing in the same millisecond share an id and the second insert is
    /// rejected by the document store.
    ///
    /// There is no rollback: if the metadata insert fails, the object already written
    /// stays in storage without a record.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        description: Option<String>,
    ) -> Result<FileRecord> {
        let file_size = data.len() as i64;
        let timestamp_millis = self.clock.now().timestamp_millis();
        let file_name = format!("{}-{}", timestamp_millis, original_filename);

        let blob_url = self.storage.upload(&file_name, data, content_type).await?;

        debug!(
            "File uploaded to container '{}': {}",
            self.storage.container_name(),
            file_name
        );

        let record = FileRecord {
            id: timestamp_millis.to_string(),
            file_name,
            original_file_name: original_filename.to_string(),
            file_size,
            description: description.unwrap_or_default(),
            blob_url,
            uploaded_at: self.clock.now(),
            uploaded_by: DEFAULT_UPLOADER.to_string(),
        };

        let document = serde_json::to_value(&record)
            .map_err(|e| AppError::Internal(format!("Failed to serialize file record: {}", e)))?;

        self.documents
            .create_item(&record.id, record.uploaded_at, document)
            .await?;

        info!(
            "File metadata saved: id={}, name={}, size={}",
            record.id, record.file_name, record.file_size
        );

        Ok(record)
    }

    /// All file records, newest upload first
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let documents = self.documents.query_all_desc().await?;

        let records = documents
            .into_iter()
            .map(|document| {
                serde_json::from_value::<FileRecord>(document)
                    .map_err(|e| AppError::Database(format!("Malformed file document: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Listed {} file records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{FixedClock, InMemoryDocumentStore, InMemoryStorage};
    use chrono::{Duration, TimeZone, Utc};

    fn service_with(
        storage: Arc<InMemoryStorage>,
        documents: Arc<InMemoryDocumentStore>,
        clock: Arc<FixedClock>,
    ) -> FileService {
        FileService::new(storage, documents, clock)
    }

    #[tokio::test]
    async fn test_upload_builds_record_from_timestamp() {
        let storage = Arc::new(InMemoryStorage::default());
        let documents = Arc::new(InMemoryDocumentStore::default());
        let clock = Arc::new(FixedClock::at_millis(1_700_000_000_000));
        let service = service_with(storage.clone(), documents.clone(), clock);

        let record = service
            .upload_file(b"abc".to_vec(), "a.txt", "text/plain", Some("hello".to_string()))
            .await
            .unwrap();

        assert_eq!(record.id, "1700000000000");
        assert_eq!(record.file_name, "1700000000000-a.txt");
        assert_eq!(record.original_file_name, "a.txt");
        assert_eq!(record.file_size, 3);
        assert_eq!(record.description, "hello");
        assert_eq!(record.uploaded_by, "demo-user");
        assert_eq!(record.blob_url, InMemoryStorage::url_for("1700000000000-a.txt"));

        assert_eq!(storage.object("1700000000000-a.txt"), Some(b"abc".to_vec()));
        assert_eq!(documents.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_description_stores_empty_string() {
        let service = service_with(
            Arc::new(InMemoryStorage::default()),
            Arc::new(InMemoryDocumentStore::default()),
            Arc::new(FixedClock::at_millis(1)),
        );

        let record = service
            .upload_file(Vec::new(), "empty.bin", "application/octet-stream", None)
            .await
            .unwrap();

        assert_eq!(record.description, "");
        assert_eq!(record.file_size, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_skips_metadata_write() {
        let storage = Arc::new(InMemoryStorage::failing("connection reset"));
        let documents = Arc::new(InMemoryDocumentStore::default());
        let service = service_with(storage, documents.clone(), Arc::new(FixedClock::at_millis(5)));

        let err = service
            .upload_file(b"x".to_vec(), "x.txt", "text/plain", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(ref msg) if msg == "connection reset"));
        assert_eq!(documents.insert_attempts(), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_leaves_orphaned_object() {
        let storage = Arc::new(InMemoryStorage::default());
        let documents = Arc::new(InMemoryDocumentStore::failing_inserts("write quota exceeded"));
        let service = service_with(storage.clone(), documents, Arc::new(FixedClock::at_millis(9)));

        let err = service
            .upload_file(b"data".to_vec(), "d.txt", "text/plain", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(storage.upload_count(), 1);
        assert!(storage.object("9-d.txt").is_some());
        assert!(service.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_millisecond_uploads_collide_on_id() {
        let documents = Arc::new(InMemoryDocumentStore::default());
        let service = service_with(
            Arc::new(InMemoryStorage::default()),
            documents.clone(),
            Arc::new(FixedClock::at_millis(42)),
        );

        service
            .upload_file(b"1".to_vec(), "one.txt", "text/plain", None)
            .await
            .unwrap();
        let second = service
            .upload_file(b"2".to_vec(), "two.txt", "text/plain", None)
            .await;

        assert!(matches!(second, Err(AppError::Database(_))));
        assert_eq!(documents.insert_attempts(), 2);
        assert_eq!(documents.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_list_files_newest_first() {
        let clock = Arc::new(FixedClock::at_millis(1_000));
        let service = service_with(
            Arc::new(InMemoryStorage::default()),
            Arc::new(InMemoryDocumentStore::default()),
            clock.clone(),
        );

        for name in ["first.txt", "second.txt", "third.txt"] {
            service
                .upload_file(name.as_bytes().to_vec(), name, "text/plain", None)
                .await
                .unwrap();
            clock.advance(Duration::seconds(1));
        }

        let records = service.list_files().await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.original_file_name.as_str()).collect();
        assert_eq!(names, vec!["third.txt", "second.txt", "first.txt"]);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].uploaded_at >= pair[1].uploaded_at));
        assert_eq!(
            records[0].uploaded_at,
            Utc.timestamp_millis_opt(3_000).unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_files_rejects_malformed_documents() {
        let documents = Arc::new(InMemoryDocumentStore::default());
        documents
            .create_item("1", Utc::now(), serde_json::json!({ "id": "1" }))
            .await
            .unwrap();
        let service = service_with(
            Arc::new(InMemoryStorage::default()),
            documents,
            Arc::new(FixedClock::at_millis(1)),
        );

        let err = service.list_files().await.unwrap_err();
        assert!(err.detail().starts_with("Malformed file document"));
    }
}
