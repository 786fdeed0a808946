#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use serde_json::Value;
use service::photos::repository::mock::MockPhotoRepository;
use service::photos::{PhotoService, PhotoServiceConfig};
use service::storage::mock::MockObjectStore;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::state::{AppState, UploadSettings};

pub const BOUNDARY: &str = "photo-upload-test-boundary";

pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self { name, file_name: Some(file_name), content_type: Some(content_type), data }
    }

    pub fn text(name: &'a str, data: &'a str) -> Self {
        Self { name, file_name: None, content_type: None, data: data.as_bytes() }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .expect("build upload request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("build get request")
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Fresh directory under `target/test-data`.
pub fn test_dir() -> PathBuf {
    let dir = PathBuf::from(format!("target/test-data/{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

pub fn dir_entries(dir: &PathBuf) -> usize {
    std::fs::read_dir(dir).expect("read test dir").count()
}

pub struct MockApp {
    pub router: Router,
    pub store: Arc<MockObjectStore>,
    pub repo: Arc<MockPhotoRepository>,
}

pub fn mock_app_with(settings: UploadSettings, cfg: PhotoServiceConfig) -> MockApp {
    let store = Arc::new(MockObjectStore::default());
    let repo = Arc::new(MockPhotoRepository::default());
    let photos = PhotoService::new(store.clone(), repo.clone(), cfg);
    let state = AppState::new(Arc::new(photos), settings);
    let router = routes::build_router(state, CorsLayer::very_permissive());
    MockApp { router, store, repo }
}

/// Disk buffering into a per-test directory, default service config.
pub fn mock_app() -> (MockApp, PathBuf) {
    let dir = test_dir();
    let settings = UploadSettings { temp_dir: dir.clone(), ..UploadSettings::default() };
    (mock_app_with(settings, PhotoServiceConfig::default()), dir)
}
