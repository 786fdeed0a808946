use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Method, Url};
use tracing::{debug, instrument};

use crate::backend::{check, SupabaseClient};
use crate::errors::StoreError;

use super::{ObjectStore, UploadOptions};

/// Object store backed by the Supabase storage REST API.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: SupabaseClient,
}

impl SupabaseStorage {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn object_url(&self, prefix: &[&str], bucket: &str, key: &str) -> Url {
        let segments = ["storage", "v1", "object"]
            .into_iter()
            .chain(prefix.iter().copied())
            .chain(std::iter::once(bucket))
            .chain(key.split('/').filter(|s| !s.is_empty()));
        self.client.endpoint(segments)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    #[instrument(skip(self, body, opts), fields(size = body.len()))]
    async fn upload(&self, bucket: &str, key: &str, body: Bytes, opts: &UploadOptions) -> Result<(), StoreError> {
        let url = self.object_url(&[], bucket, key);
        let resp = self
            .client
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, &opts.content_type)
            .header(header::CACHE_CONTROL, format!("max-age={}", opts.cache_control_secs))
            .header("x-upsert", if opts.upsert { "true" } else { "false" })
            .body(body)
            .send()
            .await?;

        match check(resp).await {
            Ok(_) => {
                debug!(%bucket, %key, "object stored");
                Ok(())
            }
            Err((409, _)) => Err(StoreError::AlreadyExists(key.to_string())),
            // Older storage versions wrap the conflict in a 400 body.
            Err((400, body)) if body.contains("\"409\"") || body.contains("Duplicate") => {
                Err(StoreError::AlreadyExists(key.to_string()))
            }
            Err((status, body)) => Err(StoreError::Status { status, body }),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> Result<Url, StoreError> {
        if key.split('/').all(str::is_empty) {
            return Err(StoreError::InvalidUrl(format!("empty object key in bucket {bucket}")));
        }
        Ok(self.object_url(&["public"], bucket, key))
    }

    #[instrument(skip(self))]
    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let url = self.client.endpoint(["storage", "v1", "object", bucket]);
        let resp = self
            .client
            .request(Method::DELETE, url)
            .json(&serde_json::json!({ "prefixes": [key] }))
            .send()
            .await?;
        check(resp)
            .await
            .map(|_| ())
            .map_err(|(status, body)| StoreError::Status { status, body })
    }
}
