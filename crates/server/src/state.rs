use std::path::PathBuf;
use std::sync::Arc;

use configs::{AppConfig, BufferMode, UploadConfig};
use service::photos::PhotoService;

/// Intake settings for `POST /upload`.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub field_name: String,
    pub buffering: BufferMode,
    pub temp_dir: PathBuf,
    pub max_file_size: Option<u64>,
}

impl From<&UploadConfig> for UploadSettings {
    fn from(cfg: &UploadConfig) -> Self {
        Self {
            field_name: cfg.field_name.clone(),
            buffering: cfg.buffering,
            temp_dir: cfg.effective_temp_dir(),
            max_file_size: cfg.effective_max_file_size(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default().upload)
    }
}

/// Shared, read-only handler state built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub photos: Arc<PhotoService>,
    pub upload: Arc<UploadSettings>,
}

impl AppState {
    pub fn new(photos: Arc<PhotoService>, upload: UploadSettings) -> Self {
        Self { photos, upload: Arc::new(upload) }
    }
}
