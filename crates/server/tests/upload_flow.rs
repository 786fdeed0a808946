mod support;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use configs::BufferMode;
use reqwest::Url;
use service::photos::PhotoServiceConfig;
use tower::ServiceExt;

use server::state::UploadSettings;
use support::{get, json_body, mock_app, mock_app_with, upload_request, Part};

const TEN_BYTES: &[u8] = b"0123456789";

#[tokio::test]
async fn missing_file_is_rejected_without_remote_calls() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::text("caption", "no photo here")]))
        .await?;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["error"].is_string());
    assert_eq!(app.store.upload_calls(), 0);
    assert_eq!(app.repo.insert_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn photo_field_without_filename_is_not_a_file() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::text("photo", "just text")]))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.upload_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn non_multipart_body_is_rejected_as_json_error() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"photo":"cat.png"}"#))?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
    assert_eq!(app.store.upload_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn store_failure_returns_500_and_skips_insert() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    app.store.set_fail_uploads(true);
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "failed to upload photo to storage");
    assert_eq!(app.store.upload_calls(), 1);
    assert_eq!(app.repo.insert_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn insert_failure_returns_500_but_object_stays_stored() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    app.repo.set_fail_inserts(true);
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["error"], "failed to save photo in database");
    let keys = app.store.keys("photos");
    assert_eq!(keys.len(), 1, "orphaned object should remain in the bucket");
    let stored = app.store.get("photos", &keys[0]).expect("orphan present");
    assert_eq!(&stored.body[..], TEN_BYTES);
    assert!(app.repo.rows("photos").is_empty());
    Ok(())
}

#[tokio::test]
async fn cat_png_upload_is_listed_with_the_same_url() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert!(body["message"].is_string());
    let url = body["url"].as_str().expect("url field").to_string();

    let parsed = Url::parse(&url)?;
    assert!(parsed.has_host());
    assert!(url.contains("photos"));
    assert!(url.contains("cat.png"));

    let key = app.store.keys("photos").pop().expect("stored");
    let stored = app.store.get("photos", &key).expect("object");
    assert_eq!(stored.opts.content_type, "image/png");
    assert_eq!(stored.opts.cache_control_secs, 3600);
    assert!(!stored.opts.upsert);

    let resp = app.router.clone().oneshot(get("/photos")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let rows = json_body(resp).await;
    let urls: Vec<&str> = rows.as_array().expect("array").iter().filter_map(|r| r["url"].as_str()).collect();
    assert!(urls.contains(&url.as_str()));
    Ok(())
}

#[tokio::test]
async fn listing_empty_table_returns_empty_array() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let resp = app.router.clone().oneshot(get("/photos")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn listing_after_uploads_contains_every_url() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let mut uploaded = Vec::new();
    for name in ["a.png", "b.jpg", "c.gif"] {
        let resp = app
            .router
            .clone()
            .oneshot(upload_request(&[Part::file("photo", name, "image/png", TEN_BYTES)]))
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        uploaded.push(json_body(resp).await["url"].as_str().unwrap_or_default().to_string());
    }

    let rows = json_body(app.router.clone().oneshot(get("/photos")).await?).await;
    let rows = rows.as_array().expect("array");
    assert!(rows.len() >= uploaded.len());
    for url in &uploaded {
        assert!(rows.iter().any(|r| r["url"] == *url), "missing {url}");
    }
    Ok(())
}

#[tokio::test]
async fn same_filename_twice_creates_two_objects_and_rows() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let mut urls = Vec::new();
    for _ in 0..2 {
        let resp = app
            .router
            .clone()
            .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        urls.push(json_body(resp).await["url"].as_str().unwrap_or_default().to_string());
    }
    assert_ne!(urls[0], urls[1]);
    assert_eq!(app.store.keys("photos").len(), 2);
    assert_eq!(app.repo.rows("photos").len(), 2);
    Ok(())
}

#[tokio::test]
async fn other_fields_are_skipped_and_content_type_defaults() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let parts = [
        Part::text("caption", "hello"),
        Part { name: "photo", file_name: Some("raw.bin"), content_type: None, data: TEN_BYTES },
    ];
    let resp = app.router.clone().oneshot(upload_request(&parts)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let key = app.store.keys("photos").pop().expect("stored");
    let stored = app.store.get("photos", &key).expect("object");
    assert_eq!(stored.opts.content_type, "application/octet-stream");
    Ok(())
}

#[tokio::test]
async fn oversized_file_in_memory_mode_is_413_without_remote_calls() -> anyhow::Result<()> {
    let settings = UploadSettings {
        buffering: BufferMode::Memory,
        max_file_size: Some(16),
        ..UploadSettings::default()
    };
    let app = mock_app_with(settings, PhotoServiceConfig::default());
    let big = [7u8; 17];
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "big.png", "image/png", &big)]))
        .await?;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(resp).await["error"].is_string());
    assert_eq!(app.store.upload_calls(), 0);
    assert_eq!(app.repo.insert_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn memory_mode_upload_succeeds_under_the_cap() -> anyhow::Result<()> {
    let settings = UploadSettings {
        buffering: BufferMode::Memory,
        max_file_size: Some(configs::DEFAULT_MEMORY_MAX_FILE_SIZE),
        ..UploadSettings::default()
    };
    let app = mock_app_with(settings, PhotoServiceConfig::default());
    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn disk_mode_leaves_no_temp_files() -> anyhow::Result<()> {
    let (app, dir) = mock_app();

    let ok = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(support::dir_entries(&dir), 0);

    app.store.set_fail_uploads(true);
    let failed = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(support::dir_entries(&dir), 0);
    Ok(())
}

#[tokio::test]
async fn orphan_removal_is_opt_in() -> anyhow::Result<()> {
    let dir = support::test_dir();
    let settings = UploadSettings { temp_dir: dir, ..UploadSettings::default() };
    let cfg = PhotoServiceConfig { delete_orphans: true, ..PhotoServiceConfig::default() };
    let app = mock_app_with(settings, cfg);
    app.repo.set_fail_inserts(true);

    let resp = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.keys("photos").is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_failure_returns_500() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    app.repo.set_fail_selects(true);
    let resp = app.router.clone().oneshot(get("/photos")).await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["error"], "failed to fetch photos");
    Ok(())
}

#[tokio::test]
async fn health_and_metrics_are_exposed() -> anyhow::Result<()> {
    let (app, _dir) = mock_app();
    let resp = app.router.clone().oneshot(get("/health")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");

    let _ = app
        .router
        .clone()
        .oneshot(upload_request(&[Part::file("photo", "cat.png", "image/png", TEN_BYTES)]))
        .await?;
    let resp = app.router.clone().oneshot(get("/metrics")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("photo_uploads_total"));
    Ok(())
}
