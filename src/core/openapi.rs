use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::health::handlers as health_handlers;
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handlers::health_check,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            // Files
            files_models::FileRecord,
            files_dtos::UploadFileDto,
            files_dtos::UploadResponseDto,
        )
    ),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "files", description = "File upload and listing"),
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
