use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::{RepoError, UploadError};

/// Client-facing error. 5xx variants carry a fixed message only; the cause
/// has already been logged by the service layer.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Validation(msg) => ApiError::BadRequest(msg),
            UploadError::TooLarge { limit } => {
                ApiError::PayloadTooLarge(format!("file exceeds maximum size of {limit} bytes"))
            }
            UploadError::StoreUpload(_) => ApiError::Internal("failed to upload photo to storage"),
            UploadError::UrlResolution(_) => ApiError::Internal("failed to generate public url"),
            UploadError::Persistence(_) => ApiError::Internal("failed to save photo in database"),
            UploadError::Unexpected(_) => ApiError::Internal("failed to upload photo"),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(_: RepoError) -> Self {
        ApiError::Internal("failed to fetch photos")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match self {
            ApiError::BadRequest(m) | ApiError::PayloadTooLarge(m) => m,
            ApiError::Internal(m) => m.to_string(),
        };
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}
