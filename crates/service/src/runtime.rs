//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime` without depending directly on `common`.

use configs::{BufferMode, UploadConfig};

/// Prepare the upload temp directory when disk buffering is enabled.
pub async fn ensure_env(upload: &UploadConfig) -> anyhow::Result<()> {
    if upload.buffering == BufferMode::Disk {
        common::env::ensure_temp_dir(&upload.effective_temp_dir()).await?;
    }
    Ok(())
}
