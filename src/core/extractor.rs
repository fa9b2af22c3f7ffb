use axum::{
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
};

use crate::core::error::AppError;
use crate::features::files::dtos::NO_FILE_MESSAGE;

/// Multipart extractor whose rejection uses the application's error body
///
/// A request that is not multipart at all cannot carry a file part, so it is
/// reported the same way as a multipart body without one.
pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Multipart::from_request(req, state).await {
            Ok(multipart) => Ok(Self(multipart)),
            Err(rejection) => {
                tracing::debug!("Rejected multipart request: {}", rejection.body_text());
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    Err(AppError::PayloadTooLarge(rejection.body_text()))
                } else {
                    Err(AppError::BadRequest(NO_FILE_MESSAGE.to_string()))
                }
            }
        }
    }
}
