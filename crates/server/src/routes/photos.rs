use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{debug, error, info, warn};

use common::types::UploadResponse;
use models::Photo;
use service::buffer::{IncomingFile, UploadBuffer};
use service::errors::UploadError;

use crate::errors::ApiError;
use crate::state::{AppState, UploadSettings};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `POST /upload`: multipart intake, then store → resolve → insert.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        service::metrics::record_upload("invalid");
        ApiError::BadRequest(format!("expected multipart/form-data body: {}", e.body_text()))
    })?;

    let file = match read_file_field(multipart, &state.upload).await {
        Ok(file) => file,
        Err(e) => {
            if e.is_client_error() {
                warn!(code = e.code(), error = %e, "upload rejected at intake");
            } else {
                error!(code = e.code(), error = %e, "upload intake failed");
            }
            service::metrics::record_upload(e.outcome());
            return Err(e.into());
        }
    };
    info!(file_name = %file.file_name, content_type = %file.content_type, size = file.size, "upload received");

    let outcome = state.photos.upload(file).await?;
    Ok(Json(UploadResponse { message: "photo uploaded successfully".into(), url: outcome.url }))
}

/// `GET /photos`: every row of the backing table, verbatim.
pub async fn list_photos(State(state): State<AppState>) -> Result<(StatusCode, Json<Vec<Photo>>), ApiError> {
    let rows = state.photos.list().await?;
    debug!(count = rows.len(), "photos listed");
    Ok((StatusCode::OK, Json(rows)))
}

/// Take the first part named after the configured field that carries a
/// filename. Other parts are skipped.
async fn read_file_field(mut multipart: Multipart, settings: &UploadSettings) -> Result<IncomingFile, UploadError> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, settings))? {
        if field.name() != Some(settings.field_name.as_str()) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = %settings.field_name, "field has no filename; not a file");
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut buf = UploadBuffer::new(settings.buffering, &settings.temp_dir, settings.max_file_size).await?;
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, settings))? {
            buf.push(&chunk).await?;
        }
        let (body, size) = buf.finish().await?;
        return Ok(IncomingFile { file_name, content_type, size, body });
    }
    Err(UploadError::Validation("no file uploaded".into()))
}

fn multipart_error(e: MultipartError, settings: &UploadSettings) -> UploadError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return UploadError::TooLarge { limit: settings.max_file_size.unwrap_or_default() };
    }
    UploadError::Validation(format!("malformed multipart body: {}", e.body_text()))
}
