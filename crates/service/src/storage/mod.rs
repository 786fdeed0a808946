//! Object storage abstraction
//!
//! `ObjectStore` is the seam between the upload workflow and the remote
//! bucket API. `SupabaseStorage` talks to the real backend; `mock` keeps
//! objects in memory for tests.

pub mod supabase;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::errors::StoreError;

pub use supabase::SupabaseStorage;

/// Per-object options sent along with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control_secs: u64,
    /// Overwrite an existing object at the same key.
    pub upsert: bool,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, bucket: &str, key: &str, body: Bytes, opts: &UploadOptions) -> Result<(), StoreError>;

    /// Public address of an object. Pure; performs no network call.
    fn public_url(&self, bucket: &str, key: &str) -> Result<Url, StoreError>;

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}

/// Simple in-memory object store for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StoredObject {
        pub body: Bytes,
        pub opts: UploadOptions,
    }

    pub struct MockObjectStore {
        base_url: String,
        objects: Mutex<HashMap<(String, String), StoredObject>>, // key: (bucket, key)
        fail_uploads: AtomicBool,
        upload_calls: AtomicUsize,
    }

    impl Default for MockObjectStore {
        fn default() -> Self {
            Self::with_base_url("https://storage.test")
        }
    }

    impl MockObjectStore {
        pub fn with_base_url(base_url: &str) -> Self {
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                objects: Mutex::new(HashMap::new()),
                fail_uploads: AtomicBool::new(false),
                upload_calls: AtomicUsize::new(0),
            }
        }

        pub fn set_fail_uploads(&self, fail: bool) {
            self.fail_uploads.store(fail, Ordering::SeqCst);
        }

        pub fn upload_calls(&self) -> usize {
            self.upload_calls.load(Ordering::SeqCst)
        }

        pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
            let objects = self.objects.lock().unwrap();
            objects.get(&(bucket.to_string(), key.to_string())).cloned()
        }

        pub fn contains(&self, bucket: &str, key: &str) -> bool {
            self.get(bucket, key).is_some()
        }

        pub fn keys(&self, bucket: &str) -> Vec<String> {
            let objects = self.objects.lock().unwrap();
            let mut keys: Vec<String> = objects
                .keys()
                .filter(|(b, _)| b == bucket)
                .map(|(_, k)| k.clone())
                .collect();
            keys.sort();
            keys
        }
    }

    #[async_trait]
    impl ObjectStore for MockObjectStore {
        async fn upload(&self, bucket: &str, key: &str, body: Bytes, opts: &UploadOptions) -> Result<(), StoreError> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(StoreError::Status { status: 503, body: "storage unavailable".into() });
            }
            let mut objects = self.objects.lock().unwrap();
            let id = (bucket.to_string(), key.to_string());
            if !opts.upsert && objects.contains_key(&id) {
                return Err(StoreError::AlreadyExists(key.to_string()));
            }
            objects.insert(id, StoredObject { body, opts: opts.clone() });
            Ok(())
        }

        fn public_url(&self, bucket: &str, key: &str) -> Result<Url, StoreError> {
            let raw = format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url);
            Url::parse(&raw).map_err(|e| StoreError::InvalidUrl(format!("{raw}: {e}")))
        }

        async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
            let mut objects = self.objects.lock().unwrap();
            objects.remove(&(bucket.to_string(), key.to_string()));
            Ok(())
        }
    }
}
