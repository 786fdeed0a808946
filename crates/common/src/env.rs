//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the upload temp directory exists and is writable.
pub async fn ensure_temp_dir(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;

    let meta = tokio::fs::metadata(dir).await?;
    if meta.permissions().readonly() {
        warn!(dir = %dir.display(), "upload temp directory is read-only; disk buffering will fail");
    } else {
        debug!(dir = %dir.display(), "upload temp directory ready");
    }
    Ok(())
}
