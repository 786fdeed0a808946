use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::backend::SupabaseClient;
use service::photos::repo::PostgrestPhotoRepository;
use service::photos::{PhotoService, PhotoServiceConfig};
use service::{runtime, storage::SupabaseStorage};

use crate::routes;
use crate::state::{AppState, UploadSettings};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the REST-backed collaborators into handler state.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let client = SupabaseClient::from_config(&cfg.backend)?;
    let store = Arc::new(SupabaseStorage::new(client.clone()));
    let repo = Arc::new(PostgrestPhotoRepository::new(client));
    let photos = PhotoService::new(store, repo, PhotoServiceConfig::from(cfg));
    Ok(AppState::new(Arc::new(photos), UploadSettings::from(&cfg.upload)))
}

/// Public entry: build the app from a validated config and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.upload).await?;

    let state = build_state(&cfg)?;
    info!(
        backend = %cfg.backend.url,
        bucket = %cfg.storage.bucket,
        table = %cfg.database.table,
        buffering = ?cfg.upload.buffering,
        max_file_size = ?state.upload.max_file_size,
        "upload service configured"
    );

    let app: Router = routes::build_router(state, build_cors());

    let addr = cfg.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "starting photo upload server");
    axum::serve(listener, app).await?;
    Ok(())
}
