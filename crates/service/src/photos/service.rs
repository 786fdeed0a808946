use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{error, info, instrument, warn};

use configs::AppConfig;
use models::{NewPhoto, Photo};

use crate::buffer::{FileBody, IncomingFile};
use crate::errors::{RepoError, StoreError, UploadError};
use crate::keys::KeyGenerator;
use crate::metrics;
use crate::photos::repository::PhotoRepository;
use crate::storage::{ObjectStore, UploadOptions};

/// Names and policies fixed at startup.
#[derive(Debug, Clone)]
pub struct PhotoServiceConfig {
    pub bucket: String,
    pub table: String,
    pub key_prefix: String,
    pub cache_control_secs: u64,
    pub delete_orphans: bool,
}

impl Default for PhotoServiceConfig {
    fn default() -> Self {
        Self {
            bucket: "photos".into(),
            table: "photos".into(),
            key_prefix: "public/".into(),
            cache_control_secs: 3600,
            delete_orphans: false,
        }
    }
}

impl From<&AppConfig> for PhotoServiceConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            bucket: cfg.storage.bucket.clone(),
            table: cfg.database.table.clone(),
            key_prefix: cfg.storage.key_prefix.clone(),
            cache_control_secs: cfg.storage.cache_control_secs,
            delete_orphans: cfg.upload.delete_orphans,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub key: String,
    pub url: String,
    pub photo: Photo,
}

/// Upload/listing business service independent of web framework
pub struct PhotoService {
    store: Arc<dyn ObjectStore>,
    repo: Arc<dyn PhotoRepository>,
    keys: KeyGenerator,
    cfg: PhotoServiceConfig,
}

impl PhotoService {
    pub fn new(store: Arc<dyn ObjectStore>, repo: Arc<dyn PhotoRepository>, cfg: PhotoServiceConfig) -> Self {
        let keys = KeyGenerator::new(cfg.key_prefix.clone());
        Self { store, repo, keys, cfg }
    }

    pub fn config(&self) -> &PhotoServiceConfig {
        &self.cfg
    }

    /// Store the file, resolve its public URL, then record it.
    ///
    /// Any temp file behind `file` is removed once the store call returns.
    /// A failed insert leaves the stored object in place unless
    /// `delete_orphans` is enabled.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use bytes::Bytes;
    /// use service::buffer::{FileBody, IncomingFile};
    /// use service::photos::{PhotoService, PhotoServiceConfig};
    /// use service::photos::repository::mock::MockPhotoRepository;
    /// use service::storage::mock::MockObjectStore;
    ///
    /// let svc = PhotoService::new(
    ///     Arc::new(MockObjectStore::default()),
    ///     Arc::new(MockPhotoRepository::default()),
    ///     PhotoServiceConfig::default(),
    /// );
    /// let file = IncomingFile {
    ///     file_name: "cat.png".into(),
    ///     content_type: "image/png".into(),
    ///     size: 3,
    ///     body: FileBody::Memory(Bytes::from_static(b"png")),
    /// };
    /// let out = tokio_test::block_on(svc.upload(file)).unwrap();
    /// assert!(out.url.contains("/photos/"));
    /// assert!(out.url.ends_with("-cat.png"));
    /// ```
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.size))]
    pub async fn upload(&self, file: IncomingFile) -> Result<UploadOutcome, UploadError> {
        let started = Instant::now();
        let result = self.run_upload(file).await;
        metrics::UPLOAD_DURATION.observe(started.elapsed().as_secs_f64());
        match &result {
            Ok(_) => metrics::record_upload("ok"),
            Err(e) => metrics::record_upload(e.outcome()),
        }
        result
    }

    async fn run_upload(&self, file: IncomingFile) -> Result<UploadOutcome, UploadError> {
        let bucket = self.cfg.bucket.as_str();
        let key = self.keys.next_key(&file.file_name);
        let opts = UploadOptions {
            content_type: file.content_type.clone(),
            cache_control_secs: self.cfg.cache_control_secs,
            upsert: false,
        };

        if let Err(e) = self.store_object(&key, file.body, &opts).await {
            error!(%bucket, %key, code = e.code(), error = %e, "object store upload failed");
            return Err(e);
        }

        let url = self
            .store
            .public_url(bucket, &key)
            .map_err(UploadError::UrlResolution)
            .and_then(|url| {
                NewPhoto::new(url.as_str())
                    .map_err(|e| UploadError::UrlResolution(StoreError::InvalidUrl(e.to_string())))
            });
        let new_photo = match url {
            Ok(p) => p,
            Err(e) => {
                error!(%bucket, %key, code = e.code(), error = %e, "public url resolution failed");
                return Err(e);
            }
        };
        info!(%key, url = %new_photo.url, "public url resolved");

        let table = self.cfg.table.as_str();
        match self.repo.insert(table, &new_photo).await {
            Ok(photo) => {
                info!(%key, %table, "photo recorded");
                Ok(UploadOutcome { key, url: new_photo.url, photo })
            }
            Err(e) => {
                error!(%bucket, %key, %table, error = %e, "metadata insert failed; stored object is orphaned");
                self.handle_orphan(&key).await;
                Err(UploadError::Persistence(e))
            }
        }
    }

    async fn store_object(&self, key: &str, body: FileBody, opts: &UploadOptions) -> Result<(), UploadError> {
        match body {
            FileBody::Memory(bytes) => self.put(key, bytes, opts).await,
            FileBody::Disk(temp) => {
                let result = match temp.read().await {
                    Ok(bytes) => self.put(key, bytes, opts).await,
                    Err(e) => Err(UploadError::Unexpected(format!("reading temp file: {e}"))),
                };
                let path = temp.path().to_path_buf();
                if let Err(e) = temp.remove().await {
                    warn!(path = %path.display(), error = %e, "failed to remove temp upload");
                }
                result
            }
        }
    }

    async fn put(&self, key: &str, bytes: Bytes, opts: &UploadOptions) -> Result<(), UploadError> {
        self.store
            .upload(&self.cfg.bucket, key, bytes, opts)
            .await
            .map_err(UploadError::StoreUpload)
    }

    async fn handle_orphan(&self, key: &str) {
        if !self.cfg.delete_orphans {
            metrics::record_orphan("kept");
            return;
        }
        match self.store.remove(&self.cfg.bucket, key).await {
            Ok(()) => {
                info!(%key, "orphaned object removed");
                metrics::record_orphan("removed");
            }
            Err(e) => {
                warn!(%key, error = %e, "failed to remove orphaned object");
                metrics::record_orphan("remove_failed");
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Photo>, RepoError> {
        match self.repo.select_all(&self.cfg.table).await {
            Ok(rows) => {
                metrics::record_listing("ok");
                Ok(rows)
            }
            Err(e) => {
                error!(table = %self.cfg.table, error = %e, "listing photos failed");
                metrics::record_listing("error");
                Err(e)
            }
        }
    }
}
