use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};

use models::{NewPhoto, Photo};

use crate::backend::{check, SupabaseClient};
use crate::errors::RepoError;
use crate::photos::repository::PhotoRepository;

/// `PhotoRepository` backed by the PostgREST table API (`/rest/v1/{table}`).
#[derive(Clone)]
pub struct PostgrestPhotoRepository {
    client: SupabaseClient,
}

impl PostgrestPhotoRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PhotoRepository for PostgrestPhotoRepository {
    #[instrument(skip(self, photo), fields(url = %photo.url))]
    async fn insert(&self, table: &str, photo: &NewPhoto) -> Result<Photo, RepoError> {
        let url = self.client.endpoint(["rest", "v1", table]);
        let resp = self
            .client
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&[photo])
            .send()
            .await?;
        let resp = check(resp)
            .await
            .map_err(|(status, body)| RepoError::Status { status, body })?;

        let mut rows: Vec<Photo> = resp
            .json()
            .await
            .map_err(|e| RepoError::Decode(e.to_string()))?;
        let row = rows
            .pop()
            .ok_or_else(|| RepoError::Decode("insert returned no rows".into()))?;
        debug!(%table, "photo row inserted");
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn select_all(&self, table: &str) -> Result<Vec<Photo>, RepoError> {
        let mut url = self.client.endpoint(["rest", "v1", table]);
        url.query_pairs_mut().append_pair("select", "*");
        let resp = self.client.request(Method::GET, url).send().await?;
        let resp = check(resp)
            .await
            .map_err(|(status, body)| RepoError::Status { status, body })?;
        resp.json()
            .await
            .map_err(|e| RepoError::Decode(e.to_string()))
    }
}
