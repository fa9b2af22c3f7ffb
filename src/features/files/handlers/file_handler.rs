use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::AppMultipart;
use crate::features::files::dtos::{
    UploadFileDto, UploadResponseDto, LIST_FAILED_MESSAGE, NO_FILE_MESSAGE,
    UPLOAD_FAILED_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
};
use crate::features::files::models::FileRecord;
use crate::features::files::services::FileService;
use crate::shared::constants::DEFAULT_CONTENT_TYPE;
use crate::shared::types::ErrorResponse;

/// File part read from the multipart body
struct UploadedFile {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
}

/// Map a multipart read failure, keeping body-limit rejections distinct
fn multipart_error(context: &str, e: axum::extract::multipart::MultipartError) -> AppError {
    debug!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, e.body_text()))
    } else {
        AppError::BadRequest(format!("{}: {}", context, e.body_text()))
    }
}

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `description`: Free-text description (optional)
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with an optional description",
    ),
    responses(
        (status = 200, description = "File uploaded and metadata saved", body = UploadResponseDto),
        (status = 400, description = "No file part in the request", body = ErrorResponse),
        (status = 413, description = "Body exceeds the configured upload limit", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<UploadResponseDto>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            // A `file` part without a filename is a plain form value, not a file
            "file" if field.file_name().is_some() => {
                if file.is_some() {
                    return Err(AppError::BadRequest(
                        "Only one file may be uploaded per request".to_string(),
                    ));
                }

                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                let file_name = field.file_name().unwrap_or_default().to_string();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;

                file = Some(UploadedFile {
                    data: data.to_vec(),
                    file_name,
                    content_type,
                });
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read description field", e))?;
                description = Some(text);
            }
            _ => {
                debug!("Ignoring field: {}", field_name);
            }
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest(NO_FILE_MESSAGE.to_string()))?;

    let metadata = service
        .upload_file(file.data, &file.file_name, &file.content_type, description)
        .await
        .map_err(|e| e.context(UPLOAD_FAILED_MESSAGE))?;

    Ok(Json(UploadResponseDto {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        metadata,
    }))
}

/// List uploaded files
///
/// Returns every file record, newest upload first.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All file records ordered by uploadedAt descending", body = Vec<FileRecord>),
        (status = 500, description = "Document store query failed", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let files = service
        .list_files()
        .await
        .map_err(|e| e.context(LIST_FAILED_MESSAGE))?;

    Ok(Json(files))
}
