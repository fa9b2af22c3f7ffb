use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::FileRecord;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Optional free-text description
    #[schema(example = "Quarterly report")]
    pub description: Option<String>,
}

/// Response DTO for a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    #[schema(example = "File uploaded & metadata saved")]
    pub message: String,
    /// The record that was persisted
    pub metadata: FileRecord,
}

/// Message returned with every successful upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded & metadata saved";

/// Message returned when the request has no file part
pub const NO_FILE_MESSAGE: &str = "No file uploaded";

/// Message for storage or database failures during upload
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// Message for listing failures
pub const LIST_FAILED_MESSAGE: &str = "Failed to fetch files";
