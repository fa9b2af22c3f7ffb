//! Object storage for uploaded binaries
//!
//! Provides the [`ObjectStorage`] seam used by the file service and an
//! S3-compatible implementation (MinIO or any S3 endpoint).

mod s3_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use s3_client::S3Client;

/// A flat container of named binary objects
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `data` under `key` and return a URL that resolves to the stored object.
    ///
    /// Returns only after the storage service has acknowledged the write.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    /// Name of the container every object is written to
    fn container_name(&self) -> String;
}
