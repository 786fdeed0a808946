//! Shared HTTP client for the managed backend.
//!
//! Object storage and the table API live under one base URL and accept
//! the same API key, sent both as `apikey` and as a bearer token.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};

use configs::BackendConfig;

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid backend url {base_url}: {e}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow::anyhow!("backend url cannot carry a path: {base_url}"));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base, key: key.to_string() })
    }

    pub fn from_config(cfg: &BackendConfig) -> anyhow::Result<Self> {
        Self::new(&cfg.url, &cfg.key, Duration::from_secs(cfg.timeout_secs))
    }

    /// Base URL with `segments` appended; each segment is percent-encoded.
    pub fn endpoint<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

/// Split a response into success or `(status, body)` for non-2xx codes.
pub(crate) async fn check(resp: Response) -> Result<Response, (u16, String)> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err((status.as_u16(), body))
}
