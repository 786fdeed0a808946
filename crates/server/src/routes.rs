use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod photos;

/// Room for multipart framing and small text fields on top of the file cap.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    match service::metrics::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}")),
    }
}

/// Build the full application router: photo routes plus health and metrics.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // The file cap is enforced per chunk in the upload handler; this only
    // keeps axum's 2 MB default from cutting in first.
    let body_limit = match state.upload.max_file_size {
        Some(max) => DefaultBodyLimit::max(usize::try_from(max).unwrap_or(usize::MAX).saturating_add(MULTIPART_OVERHEAD)),
        None => DefaultBodyLimit::disable(),
    };

    let api = Router::new()
        .route("/upload", post(photos::upload_photo))
        .route("/photos", get(photos::list_photos))
        .layer(body_limit);

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    api.merge(ops)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
