//! Router assembly shared by the binary and the end-to-end tests

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::AppConfig;
use crate::core::middleware;
use crate::features::files::{routes as files_routes, FileService};
use crate::features::{frontend, health};

/// Build the application router
pub fn create_app(
    file_service: Arc<FileService>,
    config: &AppConfig,
    openapi: OpenApiDoc,
) -> Router {
    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi);

    Router::new()
        .merge(swagger)
        .merge(health::routes())
        .merge(frontend::routes())
        .merge(files_routes::routes(file_service, config.max_upload_size))
        .layer(middleware::cors_layer(config.cors_allowed_origins.clone()))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
