/// Liveness message returned by `GET /`
pub const LIVENESS_MESSAGE: &str = "Backend is running successfully";

/// Liveness check
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    )
)]
pub async fn health_check() -> &'static str {
    LIVENESS_MESSAGE
}
